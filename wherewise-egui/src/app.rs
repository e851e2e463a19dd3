use std::sync::Arc;

use egui::{Color32, RichText, Ui};
use wherewise::screen::{
    build_screen, AdviceCard, LocationCard, Screen, ADVICE_BUTTON_CAPTION, ADVICE_CARD_LABEL,
    LOCATION_CARD_TITLE,
};
use wherewise::{Controller, Store};

use crate::egui_map::EguiMapState;

const BACKGROUND: Color32 = Color32::from_rgb(255, 195, 225);
const ACCENT: Color32 = Color32::from_rgb(105, 0, 167);
const CARD_BACKGROUND: Color32 = Color32::from_rgb(186, 112, 255);
const CARD_TEXT: Color32 = Color32::WHITE;
const MAP_HEIGHT: f32 = 200.0;

/// The application window contents.
///
/// Each frame takes a state snapshot, builds the [`Screen`] description and
/// renders it. All mutations go through the store, so the UI itself keeps no
/// application state besides the map camera.
pub struct WherewiseApp {
    store: Arc<Store>,
    controller: Arc<Controller>,
    map: EguiMapState,
}

impl WherewiseApp {
    /// Creates the app over the given store and controller.
    pub fn new(store: Arc<Store>, controller: Arc<Controller>, map: EguiMapState) -> Self {
        Self {
            store,
            controller,
            map,
        }
    }

    /// Renders one frame.
    pub fn show(&mut self, ctx: &egui::Context) {
        // Clear the pending-redraw flag on every frame, not only when the
        // map is rendered, so notifications never stop waking the loop.
        self.map.begin_frame();

        let screen = build_screen(&self.store.snapshot());

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(BACKGROUND)
                    .inner_margin(egui::Margin::same(20)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink(false)
                    .show(ui, |ui| {
                        self.show_screen(ui, &screen);
                    });
            });

        self.show_alert(ctx, &screen);
        self.show_permission_prompt(ctx, &screen);
    }

    fn show_screen(&mut self, ui: &mut Ui, screen: &Screen) {
        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            ui.label(RichText::new(screen.title).size(26.0).strong().color(ACCENT));
            ui.add_space(30.0);

            if let Some(card) = &screen.location_card {
                self.show_location_card(ui, card);
                ui.add_space(30.0);
            }

            if let Some(card) = &screen.advice_card {
                self.show_advice_card(ui, card);
                ui.add_space(30.0);
            }

            if screen.advice_button_visible {
                self.show_advice_button(ui);
            }
        });
    }

    fn show_location_card(&mut self, ui: &mut Ui, card: &LocationCard) {
        card_frame().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(LOCATION_CARD_TITLE)
                        .size(20.0)
                        .strong()
                        .color(CARD_TEXT),
                );
                ui.add_space(10.0);
                ui.label(
                    RichText::new(format!("Latitude: {}", card.latitude))
                        .size(16.0)
                        .color(CARD_TEXT),
                );
                ui.add_space(10.0);
                ui.label(
                    RichText::new(format!("Longitude: {}", card.longitude))
                        .size(16.0)
                        .color(CARD_TEXT),
                );
                ui.add_space(10.0);

                let map_size = egui::vec2(ui.available_width(), MAP_HEIGHT);
                self.map.render(ui, card, map_size);
            });
        });
    }

    fn show_advice_card(&self, ui: &mut Ui, card: &AdviceCard) {
        card_frame().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(ADVICE_CARD_LABEL).size(16.0).color(CARD_TEXT));
                ui.add_space(5.0);
                ui.label(RichText::new(&card.text).size(16.0).color(CARD_TEXT));
            });
        });
    }

    fn show_advice_button(&self, ui: &mut Ui) {
        let button = egui::Button::new(
            RichText::new(ADVICE_BUTTON_CAPTION)
                .size(16.0)
                .color(Color32::WHITE),
        )
        .fill(ACCENT)
        .corner_radius(egui::CornerRadius::same(4))
        .min_size(egui::vec2(ui.available_width(), 36.0));

        if ui.add(button).clicked() {
            let controller = self.controller.clone();
            wherewise::async_runtime::spawn(async move {
                controller.request_advice().await;
            });
        }
    }

    fn show_alert(&self, ctx: &egui::Context, screen: &Screen) {
        let Some(alert) = &screen.alert else {
            return;
        };

        // The backdrop blocks the screen behind it. Dismissal goes through
        // the OK button only.
        egui::Modal::new(egui::Id::new("alert")).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(alert.title()).strong());
                if let Some(message) = alert.message() {
                    ui.add_space(5.0);
                    ui.label(message);
                }
                ui.add_space(10.0);
                if ui.button("OK").clicked() {
                    self.store.dismiss_alert();
                }
            });
        });
    }

    fn show_permission_prompt(&self, ctx: &egui::Context, screen: &Screen) {
        let Some(prompt) = &screen.permission_prompt else {
            return;
        };

        egui::Modal::new(egui::Id::new("permission_prompt")).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(prompt.message()).strong());
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Don't allow").clicked() {
                        self.store.resolve_permission_prompt(false);
                    }
                    if ui.button("Allow").clicked() {
                        self.store.resolve_permission_prompt(true);
                    }
                });
            });
        });
    }
}

fn card_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(CARD_BACKGROUND)
        .corner_radius(egui::CornerRadius::same(10))
        .inner_margin(egui::Margin::same(20))
}
