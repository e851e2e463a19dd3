use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use wherewise::tile_fetcher::TileFetcher;
use wherewise::{Controller, Store};

use crate::{EguiMapState, WherewiseApp};

impl eframe::App for WherewiseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

/// Sets up logging, the async runtime and the window, and runs the app.
pub struct InitBuilder {
    store: Arc<Store>,
    controller: Arc<Controller>,
    native_options: Option<eframe::NativeOptions>,
}

impl InitBuilder {
    /// Creates a builder for the given store and controller.
    pub fn new(store: Arc<Store>, controller: Controller) -> Self {
        Self {
            store,
            controller: Arc::new(controller),
            native_options: None,
        }
    }

    /// Overrides the window options.
    pub fn with_native_options(mut self, options: eframe::NativeOptions) -> Self {
        self.native_options = Some(options);
        self
    }

    /// Runs the application. Returns when the window is closed.
    pub fn init(self) -> eframe::Result {
        env_logger::init();

        let runtime = Runtime::new().expect("Unable to create Runtime");
        let handle = runtime.handle().clone();
        let _enter = handle.enter();

        // Keep the runtime alive for as long as the window runs. Tasks are
        // spawned from the UI thread through the entered handle.
        std::thread::spawn(move || {
            runtime.block_on(async {
                loop {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
            })
        });

        let native_options = self.native_options.unwrap_or_else(default_native_options);

        let store = self.store;
        let controller = self.controller;

        eframe::run_native(
            "Location and Advice",
            native_options,
            Box::new(move |cc| {
                let map = EguiMapState::new(cc.egui_ctx.clone(), TileFetcher::osm());
                store.set_messenger(map.messenger());

                let starter = controller.clone();
                wherewise::async_runtime::spawn(async move {
                    starter.start().await;
                });

                Ok(Box::new(WherewiseApp::new(store, controller, map)))
            }),
        )
    }
}

fn default_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 760.0]),
        ..Default::default()
    }
}
