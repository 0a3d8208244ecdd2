use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use zonebot_core::{Coordinates, Geocoder};

/// Default public Nominatim endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Free-text geocoding via the Nominatim search API.
///
/// Nominatim's usage policy requires an identifying User-Agent; the whole
/// request is bounded by the configured timeout so a slow upstream never
/// stalls a session beyond it.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn parse_coordinate(hit: &serde_json::Value, field: &str) -> anyhow::Result<f64> {
        hit[field]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing {field}"))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> anyhow::Result<Option<Coordinates>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let Some(hit) = response.as_array().and_then(|hits| hits.first()) else {
            debug!("No geocoding match for {query:?}");
            return Ok(None);
        };

        let coords = Coordinates {
            latitude: Self::parse_coordinate(hit, "lat")?,
            longitude: Self::parse_coordinate(hit, "lon")?,
        };

        debug!(
            "Geocoded {query:?} to ({}, {})",
            coords.latitude, coords.longitude
        );
        Ok(Some(coords))
    }
}
