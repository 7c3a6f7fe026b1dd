use reqwest::Url;
use std::time::Duration;
use tracing::warn;

use super::GeographyProvider;
use super::geojson::Feature;
use crate::domain::{Region, RegionId};
use crate::error::ProviderError;

const USER_AGENT: &str = concat!("dotmap/", env!("CARGO_PKG_VERSION"));

/// Geography provider served over HTTP.
///
/// Layout under `base_url`:
/// - `<id>.json` - one GeoJSON Feature per region
/// - `index/<category>.json` - JSON array of region ids
///
/// Ids and categories are percent-encoded as single path segments.
#[derive(Debug)]
pub struct RemoteProvider {
    base_url: Url,
    client: reqwest::blocking::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl RemoteProvider {
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::Http(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::Http(format!(
                "base URL '{}' cannot hold paths",
                base_url
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            max_retries: max_retries.max(1),
            retry_delay: Duration::from_secs(2),
        })
    }

    fn url_for(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    pub fn region_url(&self, id: &RegionId) -> String {
        self.url_for(&[&format!("{}.json", id)])
    }

    pub fn index_url(&self, category: &str) -> String {
        self.url_for(&["index", &format!("{}.json", category)])
    }

    /// GET `url`, retrying rate limits and server errors.
    ///
    /// Returns `Ok(None)` on 404.
    fn fetch(&self, url: &str) -> Result<Option<String>, ProviderError> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let wait = self.retry_delay * attempt;
                warn!(
                    url,
                    attempt = attempt + 1,
                    max = self.max_retries,
                    "retrying geography request in {:?}",
                    wait
                );
                std::thread::sleep(wait);
            }

            let response = match self.client.get(url).send() {
                Ok(r) => r,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_error = Some(e.to_string());
                    continue;
                }
                Err(e) => return Err(ProviderError::Http(format!("{}: {}", url, e))),
            };

            let status = response.status();
            match status.as_u16() {
                200 => {
                    let body = response
                        .text()
                        .map_err(|e| ProviderError::Http(format!("{}: {}", url, e)))?;
                    return Ok(Some(body));
                }
                404 => return Ok(None),
                429 | 500..=599 => {
                    last_error = Some(format!("status {}", status));
                    continue;
                }
                _ => return Err(ProviderError::Http(format!("{}: status {}", url, status))),
            }
        }

        Err(ProviderError::Http(format!(
            "{} failed after {} attempts: {}",
            url,
            self.max_retries,
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}

/// A region body that does not parse is malformed data for that region
fn region_from_body(id: &RegionId, body: &str) -> Result<Region, ProviderError> {
    let feature: Feature = serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
        id: id.clone(),
        reason: e.to_string(),
    })?;
    feature.to_region(id)
}

impl GeographyProvider for RemoteProvider {
    fn resolve(&self, id: &RegionId) -> Result<Region, ProviderError> {
        let body = self
            .fetch(&self.region_url(id))?
            .ok_or_else(|| ProviderError::UnresolvedRegion(id.clone()))?;
        region_from_body(id, &body)
    }

    fn list_regions(&self, category: &str) -> Result<Vec<RegionId>, ProviderError> {
        let body = self
            .fetch(&self.index_url(category))?
            .ok_or_else(|| ProviderError::Http(format!("unknown category '{}'", category)))?;
        let ids: Vec<String> = serde_json::from_str(&body)?;
        Ok(ids.into_iter().map(RegionId::from).collect())
    }
}
