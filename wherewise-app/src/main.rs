//! Desktop entry point of the Wherewise app.
//!
//! Wires the production providers together: the in-app permission dialog,
//! IP-based positioning and the advice service, then hands control to the
//! UI event loop.

use std::sync::Arc;

use wherewise::advice::AdviceClient;
use wherewise::location::{DialogPermissions, IpLookupLocation};
use wherewise::{Controller, Store};
use wherewise_egui::InitBuilder;

fn main() {
    let store = Arc::new(Store::new());
    let controller = Controller::new(
        store.clone(),
        DialogPermissions::new(store.clone()),
        IpLookupLocation::new(),
        AdviceClient::new(),
    );

    InitBuilder::new(store, controller)
        .init()
        .expect("failed to initialize");
}
