//! Downloading of raster map tiles.

use bytes::Bytes;

use crate::decoded_image::DecodedImage;
use crate::error::WherewiseError;
use crate::tile_schema::TileIndex;

/// Builds the URL a tile must be requested from.
pub trait UrlSource: Fn(&TileIndex) -> String + Send + Sync {}
impl<T: Fn(&TileIndex) -> String + Send + Sync> UrlSource for T {}

/// Attribution of a tile data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    text: String,
    url: Option<String>,
}

impl Attribution {
    /// Creates a new attribution.
    pub fn new(text: impl Into<String>, url: Option<String>) -> Self {
        Self {
            text: text.into(),
            url,
        }
    }

    /// Text to display over the map.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Link target of the attribution.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Downloads tiles one by one with REST HTTP GET requests.
///
/// Works with any service that serves each tile at its own URL, such as the
/// OSM tile protocol or a TMS endpoint.
pub struct TileFetcher {
    http_client: reqwest::Client,
    url_source: Box<dyn UrlSource>,
    attribution: Option<Attribution>,
}

impl TileFetcher {
    /// Creates a fetcher with the given URL scheme and no attribution.
    pub fn new(url_source: impl UrlSource + 'static) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .build()
            .expect("failed to initialize HTTP client");

        Self {
            http_client,
            url_source: Box::new(url_source),
            attribution: None,
        }
    }

    /// Creates a fetcher for the OpenStreetMap tile service.
    pub fn osm() -> Self {
        Self::new(|index: &TileIndex| {
            format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                index.z, index.x, index.y
            )
        })
        .with_attribution(Attribution::new(
            "© OpenStreetMap contributors",
            Some("https://www.openstreetmap.org/copyright".to_string()),
        ))
    }

    /// Sets the attribution of the tile source.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Attribution of the tile source, if it has one.
    pub fn attribution(&self) -> Option<&Attribution> {
        self.attribution.as_ref()
    }

    /// URL the tile with the given index is loaded from.
    pub fn url_for(&self, index: TileIndex) -> String {
        (self.url_source)(&index)
    }

    /// Downloads and decodes one tile.
    pub async fn load(&self, index: TileIndex) -> Result<DecodedImage, WherewiseError> {
        let url = self.url_for(index);
        log::info!("Loading {url}");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("Failed to load {url}: {status}");
            return Err(WherewiseError::Http(format!("unexpected status {status}")));
        }

        let bytes: Bytes = response.bytes().await?;
        DecodedImage::decode(&bytes)
    }
}
