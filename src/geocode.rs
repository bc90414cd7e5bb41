//! Reverse geocoding client.
//!
//! Resolves coordinates to a city name through a Nominatim-compatible
//! `/reverse` endpoint. Used when a reporter submits an alert without
//! typing the city.
//!
//! # API Reference
//!
//! See: <https://nominatim.org/release-docs/latest/api/Reverse/>

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::model::Coordinates;

/// Upper bound for a whole lookup, connect included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("floodalert/", env!("CARGO_PKG_VERSION"));

/// Client for a Nominatim-compatible reverse geocoding API.
#[derive(Clone)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl ReverseGeocoder {
    /// Create a client for `base_url` with [`DEFAULT_TIMEOUT`].
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn reverse_url(&self, at: Coordinates) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.base_url, at.latitude, at.longitude
        )
    }

    /// Look up the city containing `at`.
    pub async fn lookup(&self, at: Coordinates) -> anyhow::Result<Option<String>> {
        let response = self
            .client
            .get(self.reverse_url(at))
            .send()
            .await?
            .error_for_status()?;

        let data = response.json::<ReverseResponse>().await?;
        Ok(data.city())
    }

    /// Like [`ReverseGeocoder::lookup`], but failures and timeouts just mean
    /// "no city".
    pub async fn city_name(&self, at: Coordinates) -> Option<String> {
        match self.lookup(at).await {
            Ok(city) => city,
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed");
                None
            }
        }
    }
}

/// Response body of the `/reverse` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<ReverseAddress>,
}

/// The parts of a Nominatim address we care about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
}

impl ReverseResponse {
    /// The most specific settlement name available.
    pub fn city(&self) -> Option<String> {
        let address = self.address.as_ref()?;
        [
            &address.city,
            &address.town,
            &address.village,
            &address.municipality,
        ]
        .into_iter()
        .flatten()
        .map(|name| name.trim())
        .find(|name| !name.is_empty())
        .map(str::to_string)
    }
}
