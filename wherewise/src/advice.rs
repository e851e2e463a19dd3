//! Retrieval of random advice from the Advice Slip API.

use serde::Deserialize;

use crate::error::WherewiseError;

/// URL of the random advice endpoint.
pub const ADVICE_URL: &str = "https://api.adviceslip.com/advice";

/// One piece of advice returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdviceSlip {
    #[serde(default)]
    id: Option<u64>,
    advice: String,
}

impl AdviceSlip {
    /// Creates a new slip.
    pub fn new(id: Option<u64>, advice: impl Into<String>) -> Self {
        Self {
            id,
            advice: advice.into(),
        }
    }

    /// Identifier assigned to the slip by the service.
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// The advice text.
    pub fn advice(&self) -> &str {
        &self.advice
    }
}

/// Wire envelope of the advice endpoint.
///
/// A response without a `slip` member, or a slip without an `advice` string,
/// is treated as a failed request.
#[derive(Debug, Deserialize)]
struct AdviceResponse {
    slip: AdviceSlip,
}

/// HTTP client of the advice endpoint.
#[derive(Debug, Clone)]
pub struct AdviceClient {
    http_client: reqwest::Client,
    url: String,
}

impl AdviceClient {
    /// Creates a client for the production endpoint.
    pub fn new() -> Self {
        Self::with_url(ADVICE_URL)
    }

    /// Creates a client for the given endpoint.
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

    /// Requests one random advice slip.
    ///
    /// The request is not retried and has no timeout beyond what the
    /// operating system applies to the connection.
    pub async fn fetch(&self) -> Result<AdviceSlip, WherewiseError> {
        let url = self.url.as_str();
        log::info!("Loading {url}");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Failed to load {url}: {status}");
            return Err(WherewiseError::Http(format!("unexpected status {status}")));
        }

        let body = response.text().await?;
        let decoded: AdviceResponse = serde_json::from_str(&body)?;

        Ok(decoded.slip)
    }
}

impl Default for AdviceClient {
    fn default() -> Self {
        Self::new()
    }
}
