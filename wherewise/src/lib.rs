//! Core of the Wherewise application: a single-screen app that shows where
//! the user is on a map and fetches one random piece of advice on demand.
//!
//! The crate is headless. It owns the application state, the logic that
//! mutates it and the map arithmetic, while the rendering is left to a UI
//! crate that consumes [`Screen`] values.
//!
//! # Main components
//!
//! * [`Store`] owns the [`AppState`]. Every mutation produces a new
//!   observable snapshot and pings the attached [`Messenger`] so the UI
//!   knows to redraw.
//! * [`build_screen`](screen::build_screen) converts a snapshot into a
//!   [`Screen`], a plain description of everything visible. It is a pure
//!   function, so the whole UI can be tested without opening a window.
//! * [`Controller`] drives the app: it runs the startup
//!   permission-and-location sequence once and handles the advice button.
//!   The platform capabilities it needs are injected as
//!   [`PermissionProvider`](location::PermissionProvider) and
//!   [`LocationProvider`](location::LocationProvider) implementations.
//! * [`MapView`], [`TileSchema`](tile_schema::TileSchema) and
//!   [`TileFetcher`](tile_fetcher::TileFetcher) supply the camera math and
//!   the OSM raster tiles for the embedded map.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wherewise::advice::AdviceClient;
//! use wherewise::location::{PermissionStatus, StaticLocation, StaticPermissions};
//! use wherewise::geo::{GeoPoint, Position};
//! use wherewise::{build_screen, Controller, Store};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(Store::new());
//! let controller = Controller::new(
//!     store.clone(),
//!     StaticPermissions(PermissionStatus::Granted),
//!     StaticLocation(Position::new(GeoPoint::latlon(40.0, -74.0))),
//!     AdviceClient::new(),
//! );
//!
//! controller.start().await;
//! let screen = build_screen(&store.snapshot());
//! assert!(screen.location_card.is_some());
//! # });
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod advice;
pub mod async_runtime;
pub mod controller;
pub mod decoded_image;
pub mod error;
pub mod geo;
pub mod location;
mod messenger;
pub mod screen;
pub mod state;
pub mod tile_fetcher;
pub mod tile_schema;
mod view;

pub use controller::Controller;
pub use error::WherewiseError;
pub use messenger::{DummyMessenger, Messenger};
pub use screen::{build_screen, Screen};
pub use state::{AppState, Store};
pub use view::MapView;

pub(crate) const USER_AGENT: &str = "wherewise/0.1";
