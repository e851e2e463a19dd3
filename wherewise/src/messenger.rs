//! Notifications from the state store to the UI.

/// Notifies the UI that the application state has changed and the screen
/// must be redrawn.
pub trait Messenger: Send + Sync {
    /// Requests a redraw of the UI.
    fn request_redraw(&self);
}

/// Messenger that does nothing. Used by headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}
