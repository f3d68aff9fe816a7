use axum::http::StatusCode;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::GeocoderConfig;
use crate::error::HomeMatchError;

fn default_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(1))
        .with_max_times(2)
        .with_jitter()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// One entry of a Nominatim `search` response. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Client for a Nominatim-compatible geocoding API, shared across requests.
#[derive(Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    search_url: Url,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl Geocoder {
    pub fn new(cfg: &GeocoderConfig) -> Result<Self, HomeMatchError> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;

        let mut search_url = cfg.base_url.clone();
        search_url
            .path_segments_mut()
            .map_err(|_| HomeMatchError::validation("geocoder base_url cannot be a base"))?
            .pop_if_empty()
            .push("search");

        let per_second = NonZeroU32::new(cfg.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            client,
            search_url,
            limiter,
        })
    }

    /// Resolve a free-form address. `Ok(None)` when the provider has no match.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, HomeMatchError> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        // every attempt, retries included, takes a limiter slot
        let resp = (|| async {
            self.limiter.until_ready().await;
            let resp = self.client.get(url.clone()).send().await?;
            if resp.status().is_server_error() {
                let status = resp.status();
                warn!("geocoder server error (will retry): {}", status);
                return Err(HomeMatchError::UpstreamStatus(status));
            }
            Ok(resp)
        })
        .retry(default_retry_policy())
        .when(|e: &HomeMatchError| {
            matches!(e, HomeMatchError::Upstream(_) | HomeMatchError::UpstreamStatus(_))
        })
        .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HomeMatchError::UpstreamStatus(status));
        }

        let places: Vec<NominatimPlace> = resp.json().await?;
        let Some(place) = places.into_iter().next() else {
            debug!(address, "geocoder returned no match");
            return Ok(None);
        };
        let (Ok(latitude), Ok(longitude)) = (place.lat.parse::<f64>(), place.lon.parse::<f64>())
        else {
            warn!(lat = %place.lat, lon = %place.lon, "geocoder returned unparsable coordinates");
            return Err(HomeMatchError::UpstreamStatus(StatusCode::BAD_GATEWAY));
        };
        Ok(Some(GeocodeResult {
            latitude,
            longitude,
            display_name: place.display_name,
        }))
    }
}
