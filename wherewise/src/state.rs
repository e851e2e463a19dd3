//! Application state and the observable store that owns it.

use std::collections::VecDeque;

use parking_lot::{Mutex, RwLock};
use tokio::sync::oneshot;

use crate::advice::AdviceSlip;
use crate::geo::Position;
use crate::messenger::Messenger;

/// A modal alert to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    title: String,
    message: Option<String>,
}

impl Alert {
    /// Creates an alert that consists of a title only.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: None,
        }
    }

    /// Creates an alert with a title and a message body.
    pub fn with_message(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: Some(message.into()),
        }
    }

    /// Title of the alert.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Message body of the alert, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A pending location permission request that the UI must put to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPrompt {
    message: String,
}

impl PermissionPrompt {
    /// Creates a new prompt with the given question.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Question shown to the user.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Immutable snapshot of the application state.
///
/// The UI renders snapshots and never mutates them. All mutations go through
/// the [`Store`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    location: Option<Position>,
    advice: Option<AdviceSlip>,
    advice_button_visible: bool,
    advice_in_flight: bool,
    alerts: VecDeque<Alert>,
    permission_prompt: Option<PermissionPrompt>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            location: None,
            advice: None,
            advice_button_visible: true,
            advice_in_flight: false,
            alerts: VecDeque::new(),
            permission_prompt: None,
        }
    }
}

impl AppState {
    /// Location of the device, once it has been acquired.
    pub fn location(&self) -> Option<Position> {
        self.location
    }

    /// The last advice slip received, if any.
    pub fn advice(&self) -> Option<&AdviceSlip> {
        self.advice.as_ref()
    }

    /// Whether the advice button is shown.
    pub fn advice_button_visible(&self) -> bool {
        self.advice_button_visible
    }

    /// Whether an advice request is currently running.
    pub fn advice_in_flight(&self) -> bool {
        self.advice_in_flight
    }

    /// The alert to be shown to the user, if any.
    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    /// Number of queued alerts, including the displayed one.
    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    /// The pending permission prompt, if any.
    pub fn permission_prompt(&self) -> Option<&PermissionPrompt> {
        self.permission_prompt.as_ref()
    }
}

/// Shared owner of the application state.
///
/// Mutations update the state under a lock and request a redraw through the
/// attached messenger, so the UI always observes a complete snapshot.
pub struct Store {
    state: RwLock<AppState>,
    prompt_responder: Mutex<Option<oneshot::Sender<bool>>>,
    messenger: RwLock<Option<Box<dyn Messenger>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates a store with the default state and no messenger.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AppState::default()),
            prompt_responder: Mutex::new(None),
            messenger: RwLock::new(None),
        }
    }

    /// Sets the messenger that is notified after every state change.
    pub fn set_messenger(&self, messenger: impl Messenger + 'static) {
        *self.messenger.write() = Some(Box::new(messenger));
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    /// Stores the acquired device location.
    ///
    /// The location is read once per session. A repeated update is ignored.
    pub fn set_location(&self, position: Position) {
        {
            let mut state = self.state.write();
            if state.location.is_some() {
                log::warn!("Ignoring repeated location update");
                return;
            }
            state.location = Some(position);
        }
        self.notify();
    }

    /// Stores a received advice slip and hides the advice button.
    ///
    /// The button never becomes visible again.
    pub fn set_advice(&self, slip: AdviceSlip) {
        {
            let mut state = self.state.write();
            state.advice = Some(slip);
            state.advice_button_visible = false;
        }
        self.notify();
    }

    /// Marks an advice request as started.
    ///
    /// Returns `false` if another request is already running, in which case
    /// the caller must not start a new one.
    pub fn begin_advice_request(&self) -> bool {
        let mut state = self.state.write();
        if state.advice_in_flight {
            return false;
        }
        state.advice_in_flight = true;
        true
    }

    /// Marks the running advice request as finished.
    pub fn finish_advice_request(&self) {
        self.state.write().advice_in_flight = false;
    }

    /// Adds an alert to the queue.
    pub fn push_alert(&self, alert: Alert) {
        self.state.write().alerts.push_back(alert);
        self.notify();
    }

    /// Removes the currently displayed alert.
    pub fn dismiss_alert(&self) {
        let dismissed = self.state.write().alerts.pop_front();
        if dismissed.is_some() {
            self.notify();
        }
    }

    /// Opens the permission prompt and remembers where to send the answer.
    ///
    /// If a prompt is already open it is replaced, and the previous requester
    /// observes a closed channel.
    pub fn open_permission_prompt(
        &self,
        prompt: PermissionPrompt,
        responder: oneshot::Sender<bool>,
    ) {
        let previous = self.prompt_responder.lock().replace(responder);
        if previous.is_some() {
            log::warn!("Replacing a permission prompt that was never answered");
        }
        self.state.write().permission_prompt = Some(prompt);
        self.notify();
    }

    /// Closes the permission prompt and sends the user's answer to the
    /// requester.
    pub fn resolve_permission_prompt(&self, granted: bool) {
        let responder = self.prompt_responder.lock().take();
        match responder {
            Some(responder) => {
                if responder.send(granted).is_err() {
                    log::warn!("Permission requester is gone, dropping the answer");
                }
            }
            None => log::warn!("Permission prompt resolved twice"),
        }
        self.state.write().permission_prompt = None;
        self.notify();
    }

    fn notify(&self) {
        if let Some(messenger) = &*self.messenger.read() {
            messenger.request_redraw();
        }
    }
}
