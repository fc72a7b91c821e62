//! services/api/src/adapters/google_books.rs
//!
//! Implements the `BookSearchService` port against the Google Books volumes API.

use async_trait::async_trait;
use library_core::domain::Volume;
use library_core::ports::{BookSearchService, PortError, PortResult};
use serde::Deserialize;
use tracing::debug;

#[derive(Clone)]
pub struct GoogleBooksAdapter {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksAdapter {
    pub fn new(http: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(rename = "infoLink")]
    info_link: Option<String>,
}

impl VolumeInfo {
    fn to_domain(self) -> Volume {
        Volume {
            title: self.title,
            authors: self.authors,
            info_link: self.info_link,
        }
    }
}

fn parse_volumes(body: VolumesResponse) -> Vec<Volume> {
    body.items
        .into_iter()
        .map(|item| item.volume_info.to_domain())
        .collect()
}

#[async_trait]
impl BookSearchService for GoogleBooksAdapter {
    async fn search_volumes(&self, query: &str) -> PortResult<Vec<Volume>> {
        let mut params = vec![("q", query)];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }

        let body: VolumesResponse = self
            .http
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(format!("Google Books request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Google Books response: {}", e)))?;

        let volumes = parse_volumes(body);
        debug!("Google Books returned {} volumes for '{}'", volumes.len(), query);
        Ok(volumes)
    }
}
