//! Location capabilities of the platform and their implementations.
//!
//! Desktop systems have no OS-level location permission dialog and usually no
//! positioning hardware, so the production providers put the permission
//! question through the application's own UI and approximate the position
//! from the network address. Tests substitute the `Static*` providers.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::error::WherewiseError;
use crate::geo::{GeoPoint, Position};
use crate::state::{PermissionPrompt, Store};

/// URL of the IP geolocation endpoint used by [`IpLookupLocation`].
pub const IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

const PERMISSION_PROMPT_MESSAGE: &str =
    "Allow \"Location and Advice\" to use your location?";

/// Answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user allowed access to the device location.
    Granted,
    /// The user refused access to the device location.
    Denied,
}

/// Access to the location permission of the platform.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Asks the user for permission to read the device location while the
    /// application is in use. Completes when the user answers.
    async fn request_foreground(&self) -> PermissionStatus;
}

/// Access to the positioning source of the platform.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Reads the current position of the device.
    async fn current_position(&self) -> Result<Position, WherewiseError>;
}

/// Permission provider that asks the user through an in-app dialog.
///
/// The question is published to the store as a [`PermissionPrompt`]; the UI
/// renders it and reports the answer back through
/// [`Store::resolve_permission_prompt`].
pub struct DialogPermissions {
    store: Arc<Store>,
}

impl DialogPermissions {
    /// Creates a provider that prompts through the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PermissionProvider for DialogPermissions {
    async fn request_foreground(&self) -> PermissionStatus {
        let (responder, answer) = oneshot::channel();
        self.store
            .open_permission_prompt(PermissionPrompt::new(PERMISSION_PROMPT_MESSAGE), responder);

        match answer.await {
            Ok(true) => PermissionStatus::Granted,
            Ok(false) => PermissionStatus::Denied,
            Err(_) => {
                log::warn!("Permission prompt was closed without an answer");
                PermissionStatus::Denied
            }
        }
    }
}

/// Permission provider with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissions(pub PermissionStatus);

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn request_foreground(&self) -> PermissionStatus {
        self.0
    }
}

/// Location provider that approximates the device position from its network
/// address.
#[derive(Debug, Clone)]
pub struct IpLookupLocation {
    http_client: reqwest::Client,
    url: String,
}

/// Fields of the IP geolocation response the provider cares about.
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: f64,
    longitude: f64,
}

impl IpLookupLocation {
    /// Creates a provider for the production endpoint.
    pub fn new() -> Self {
        Self::with_url(IP_LOOKUP_URL)
    }

    /// Creates a provider for the given endpoint.
    pub fn with_url(url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()
            .expect("failed to initialize HTTP client");

        Self {
            http_client,
            url: url.into(),
        }
    }
}

impl Default for IpLookupLocation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationProvider for IpLookupLocation {
    async fn current_position(&self) -> Result<Position, WherewiseError> {
        let url = self.url.as_str();
        log::info!("Loading {url}");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Failed to load {url}: {status}");
            return Err(WherewiseError::Http(format!("unexpected status {status}")));
        }

        let body = response.text().await?;
        let decoded: IpLookupResponse = serde_json::from_str(&body)?;

        Ok(
            Position::new(GeoPoint::latlon(decoded.latitude, decoded.longitude))
                .with_timestamp(SystemTime::now()),
        )
    }
}

/// Location provider with a fixed reading.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation(pub Position);

#[async_trait]
impl LocationProvider for StaticLocation {
    async fn current_position(&self) -> Result<Position, WherewiseError> {
        Ok(self.0)
    }
}
