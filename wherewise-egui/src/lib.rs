//! Egui user interface for the Wherewise app: the window contents, the map
//! widget and the desktop bootstrap.

mod egui_map;
pub use egui_map::{EguiMapState, MapStateMessenger};

mod app;
pub use app::WherewiseApp;

#[cfg(feature = "init")]
mod init;
#[cfg(feature = "init")]
pub use init::InitBuilder;
