//! services/api/src/adapters/wikipedia.rs
//!
//! Implements the `EncyclopediaService` port on top of Wikipedia.
//!
//! Title search (`action=query`) and disambiguation links (`action=parse`) go
//! through the MediaWiki action API, page summaries through the REST
//! `page/summary` endpoint.

use async_trait::async_trait;
use library_core::ports::{EncyclopediaService, PageSummary, PortError, PortResult};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

#[derive(Clone)]
pub struct WikipediaAdapter {
    http: reqwest::Client,
    api_url: String,
    rest_url: String,
}

impl WikipediaAdapter {
    pub fn new(http: reqwest::Client, api_url: String, rest_url: String) -> Self {
        Self {
            http,
            api_url,
            rest_url,
        }
    }

    fn summary_url(&self, title: &str) -> PortResult<Url> {
        let segment = title.replace(' ', "_");
        let mut url = Url::parse(&self.rest_url)
            .map_err(|e| PortError::Unexpected(format!("bad Wikipedia REST url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected("Wikipedia REST url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["page", "summary", segment.as_str()]);
        Ok(url)
    }

    async fn action_api<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: &[(&str, &str)],
    ) -> PortResult<T> {
        self.http
            .get(&self.api_url)
            .query(&[("action", action), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| PortError::Unexpected(format!("Wikipedia request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Wikipedia response: {}", e)))
    }

    /// Article links of a page in the order they appear in its wikitext.
    async fn page_links(&self, title: &str) -> PortResult<Vec<String>> {
        let body: ParseResponse = self
            .action_api("parse", &[("page", title), ("prop", "links"), ("redirects", "1")])
            .await?;
        Ok(body.into_titles())
    }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    parse: Option<ParsedPage>,
}

#[derive(Debug, Deserialize)]
struct ParsedPage {
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    ns: i64,
    title: String,
}

const ARTICLE_NAMESPACE: i64 = 0;

impl ParseResponse {
    fn into_titles(self) -> Vec<String> {
        self.parse
            .into_iter()
            .flat_map(|page| page.links)
            .filter(|link| link.ns == ARTICLE_NAMESPACE)
            .map(|link| link.title)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "type", default)]
    page_type: String,
    title: String,
    #[serde(default)]
    extract: String,
}

#[async_trait]
impl EncyclopediaService for WikipediaAdapter {
    async fn search(&self, topic: &str, limit: usize) -> PortResult<Vec<String>> {
        let limit = limit.to_string();
        let body: SearchResponse = self
            .action_api(
                "query",
                &[("list", "search"), ("srsearch", topic), ("srlimit", limit.as_str())],
            )
            .await?;
        let titles: Vec<String> = body
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default();
        debug!("Wikipedia search for '{}' returned {:?}", topic, titles);
        Ok(titles)
    }

    async fn page_summary(&self, title: &str) -> PortResult<PageSummary> {
        let resp = self
            .http
            .get(self.summary_url(title)?)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Wikipedia request failed: {}", e)))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(PortError::NotFound(format!("Wikipedia page '{}'", title)));
        }

        let summary: SummaryResponse = resp
            .error_for_status()
            .map_err(|e| PortError::Unexpected(format!("Wikipedia request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(format!("Wikipedia response: {}", e)))?;

        if summary.page_type == "disambiguation" {
            let options = self.page_links(&summary.title).await?;
            return Ok(PageSummary::Disambiguation {
                title: summary.title,
                options,
            });
        }

        Ok(PageSummary::Article {
            title: summary.title,
            extract: summary.extract,
        })
    }
}
