//! Orchestration of the startup sequence and of user actions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::advice::AdviceClient;
use crate::location::{LocationProvider, PermissionProvider, PermissionStatus};
use crate::state::{Alert, Store};

const LOCATION_DENIED_ALERT: &str = "Enable your device's location.";
const ADVICE_ERROR_TITLE: &str = "Error";
const ADVICE_ERROR_MESSAGE: &str = "Unable to retrieve advice. Please try again later.";

/// Drives the application: runs the startup location sequence and handles
/// the advice button.
///
/// The controller owns no UI. It mutates the [`Store`] and lets the attached
/// messenger tell the UI to redraw.
pub struct Controller {
    store: Arc<Store>,
    permissions: Box<dyn PermissionProvider>,
    location: Box<dyn LocationProvider>,
    advice: AdviceClient,
    started: AtomicBool,
}

impl Controller {
    /// Creates a controller over the given store and providers.
    pub fn new(
        store: Arc<Store>,
        permissions: impl PermissionProvider + 'static,
        location: impl LocationProvider + 'static,
        advice: AdviceClient,
    ) -> Self {
        Self {
            store,
            permissions: Box::new(permissions),
            location: Box::new(location),
            advice,
            started: AtomicBool::new(false),
        }
    }

    /// Runs the startup sequence: asks for the location permission and, if
    /// granted, reads the position once.
    ///
    /// The sequence runs once per session. Calling this again is a no-op.
    pub async fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            log::debug!("Startup sequence already ran, ignoring");
            return;
        }

        match self.permissions.request_foreground().await {
            PermissionStatus::Denied => {
                log::info!("Location permission denied");
                self.store.push_alert(Alert::new(LOCATION_DENIED_ALERT));
            }
            PermissionStatus::Granted => match self.location.current_position().await {
                Ok(position) => {
                    let point = position.point();
                    log::info!(
                        "Location acquired: lat {}, lon {}",
                        point.lat(),
                        point.lon()
                    );
                    self.store.set_location(position);
                }
                Err(error) => {
                    // The location card simply never appears in this case.
                    log::error!("Failed to read device location: {error}");
                }
            },
        }
    }

    /// Fetches one advice slip and stores it.
    ///
    /// On success the advice button disappears for the rest of the session.
    /// On failure the user is alerted and may press the button again. A press
    /// while a request is still running is ignored.
    pub async fn request_advice(&self) {
        if !self.store.begin_advice_request() {
            log::debug!("Advice request already in flight, ignoring");
            return;
        }

        match self.advice.fetch().await {
            Ok(slip) => {
                log::info!("Received advice slip {:?}", slip.id());
                self.store.set_advice(slip);
            }
            Err(error) => {
                log::error!("Failed to fetch advice: {error}");
                self.store
                    .push_alert(Alert::with_message(ADVICE_ERROR_TITLE, ADVICE_ERROR_MESSAGE));
            }
        }

        self.store.finish_advice_request();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use insta::assert_compact_debug_snapshot;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::advice::AdviceSlip;
    use crate::error::WherewiseError;
    use crate::geo::{GeoPoint, Position};
    use crate::location::{StaticLocation, StaticPermissions};

    /// Serves exactly one canned HTTP response on a random local port.
    async fn serve_one_response(body: &'static str, delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test server");
        let addr = listener.local_addr().expect("failed to get server address");

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                tokio::time::sleep(delay).await;

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}/advice")
    }

    fn test_controller(
        permissions: StaticPermissions,
        advice_url: &str,
    ) -> (Arc<Store>, Controller) {
        let store = Arc::new(Store::new());
        store.set_messenger(crate::DummyMessenger);
        let controller = Controller::new(
            store.clone(),
            permissions,
            StaticLocation(Position::new(GeoPoint::latlon(40.0, -74.0))),
            AdviceClient::with_url(advice_url),
        );
        (store, controller)
    }

    struct CountingLocation {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl crate::location::LocationProvider for CountingLocation {
        async fn current_position(&self) -> Result<Position, WherewiseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Position::new(GeoPoint::latlon(40.0, -74.0)))
        }
    }

    struct FailingLocation;

    #[async_trait::async_trait]
    impl crate::location::LocationProvider for FailingLocation {
        async fn current_position(&self) -> Result<Position, WherewiseError> {
            Err(WherewiseError::Generic("no position source".into()))
        }
    }

    #[tokio::test]
    async fn startup_stores_location_when_granted() {
        let (store, controller) =
            test_controller(StaticPermissions(PermissionStatus::Granted), "http://invalid/");

        controller.start().await;

        let state = store.snapshot();
        let location = state.location().expect("location must be stored");
        assert_eq!(location.point().lat(), 40.0);
        assert_eq!(location.point().lon(), -74.0);
        assert_eq!(state.alert_count(), 0);
    }

    #[tokio::test]
    async fn startup_pushes_alert_when_denied() {
        let (store, controller) =
            test_controller(StaticPermissions(PermissionStatus::Denied), "http://invalid/");

        controller.start().await;

        let state = store.snapshot();
        assert!(state.location().is_none());
        assert_eq!(state.alert_count(), 1);
        assert_compact_debug_snapshot!(state.current_alert(), @r#"Some(Alert { title: "Enable your device's location.", message: None })"#);
    }

    #[tokio::test]
    async fn startup_runs_only_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(Store::new());
        let controller = Controller::new(
            store.clone(),
            StaticPermissions(PermissionStatus::Granted),
            CountingLocation {
                calls: calls.clone(),
            },
            AdviceClient::with_url("http://invalid/"),
        );

        controller.start().await;
        controller.start().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn startup_swallows_position_errors() {
        let store = Arc::new(Store::new());
        let controller = Controller::new(
            store.clone(),
            StaticPermissions(PermissionStatus::Granted),
            FailingLocation,
            AdviceClient::with_url("http://invalid/"),
        );

        controller.start().await;

        let state = store.snapshot();
        assert!(state.location().is_none());
        assert_eq!(state.alert_count(), 0);
    }

    #[tokio::test]
    async fn advice_success_stores_slip_and_hides_button() {
        let url =
            serve_one_response(r#"{"slip": {"id": 117, "advice": "Be kind."}}"#, Duration::ZERO)
                .await;
        let (store, controller) =
            test_controller(StaticPermissions(PermissionStatus::Granted), &url);

        controller.request_advice().await;

        let state = store.snapshot();
        assert_eq!(state.advice().map(AdviceSlip::advice), Some("Be kind."));
        assert!(!state.advice_button_visible());
        assert_eq!(state.alert_count(), 0);
        assert!(!state.advice_in_flight());
    }

    #[tokio::test]
    async fn advice_wire_failure_pushes_alert() {
        let url = serve_one_response("{}", Duration::ZERO).await;
        let (store, controller) =
            test_controller(StaticPermissions(PermissionStatus::Granted), &url);

        controller.request_advice().await;

        let state = store.snapshot();
        assert!(state.advice().is_none());
        assert!(state.advice_button_visible());
        assert!(!state.advice_in_flight());
        assert_eq!(state.alert_count(), 1);

        let alert = state.current_alert().expect("alert must be shown");
        assert_eq!(alert.title(), "Error");
        assert_eq!(
            alert.message(),
            Some("Unable to retrieve advice. Please try again later.")
        );
    }

    #[tokio::test]
    async fn advice_transport_failure_pushes_alert() {
        // Nothing listens on port 1, the connection is refused immediately.
        let (store, controller) = test_controller(
            StaticPermissions(PermissionStatus::Granted),
            "http://127.0.0.1:1/advice",
        );

        controller.request_advice().await;

        let state = store.snapshot();
        assert!(state.advice().is_none());
        assert!(state.advice_button_visible());
        assert_eq!(state.alert_count(), 1);
        assert_eq!(
            state.current_alert().map(Alert::title),
            Some("Error")
        );
    }

    #[tokio::test]
    async fn advice_failure_keeps_the_previous_slip() {
        let (store, controller) = test_controller(
            StaticPermissions(PermissionStatus::Granted),
            "http://127.0.0.1:1/advice",
        );
        store.set_advice(AdviceSlip::new(Some(1), "Old advice."));

        controller.request_advice().await;

        let state = store.snapshot();
        assert_eq!(state.advice().map(AdviceSlip::advice), Some("Old advice."));
        assert_eq!(state.alert_count(), 1);
    }

    #[tokio::test]
    async fn rapid_double_press_issues_a_single_request() {
        let url = serve_one_response(
            r#"{"slip": {"id": 117, "advice": "Be kind."}}"#,
            Duration::from_millis(100),
        )
        .await;
        let (store, controller) =
            test_controller(StaticPermissions(PermissionStatus::Granted), &url);
        let controller = Arc::new(controller);

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.request_advice().await })
        };
        for _ in 0..100 {
            if store.snapshot().advice_in_flight() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(store.snapshot().advice_in_flight());

        // The second press returns immediately without touching the network.
        // The fixture server accepts only one connection, so a second request
        // would end in a failure alert.
        controller.request_advice().await;

        first.await.expect("request task must not panic");

        let state = store.snapshot();
        assert_eq!(state.advice().map(AdviceSlip::advice), Some("Be kind."));
        assert!(!state.advice_button_visible());
        assert_eq!(state.alert_count(), 0);
        assert!(!state.advice_in_flight());
    }
}
