//! Catalog search client
//!
//! Issues a single GET against the catalog search endpoint and reduces the
//! response to a [`SearchOutcome`]. Failures are terminal for the call: there
//! is no retry and no backoff.

use std::future::Future;

use reqwest::{header, Client, RequestBuilder};
use url::Url;

use crate::config::AppConfig;
use crate::errors::SearchError;
use super::content::{SearchResponse, TrackRecord};

pub const SEARCH_LIMIT: u32 = 25;
pub const SEARCH_ENTITY: &str = "song";

/// Result of one search call
#[derive(Debug)]
pub enum SearchOutcome {
    Success(Vec<TrackRecord>),
    Empty,
    Failure(SearchError),
}

impl SearchOutcome {
    fn from_result(result: Result<Vec<TrackRecord>, SearchError>) -> Self {
        match result {
            Ok(tracks) if tracks.is_empty() => SearchOutcome::Empty,
            Ok(tracks) => SearchOutcome::Success(tracks),
            Err(e) => SearchOutcome::Failure(e),
        }
    }
}

/// Anything that can answer a catalog search
pub trait SearchBackend: Send + Sync {
    fn search(&self, term: &str) -> impl Future<Output = SearchOutcome> + Send;
}

/// Decode a search response body. A body without `results` has no tracks.
///
/// Entries that are not tracks (no integer `trackId`) are skipped.
pub fn parse_search_response(body: &str) -> Result<Vec<TrackRecord>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)?;

    let tracks = response
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<TrackRecord>(entry) {
            Ok(track) => Some(track),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping catalog entry that is not a track");
                None
            }
        })
        .collect();

    Ok(tracks)
}

/// reqwest-backed client for the iTunes Search API
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    endpoint: Url,
}

impl CatalogClient {
    pub fn new(config: &AppConfig) -> Result<Self, SearchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.http_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SearchError::Http(format!("build client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.search_url.clone(),
        })
    }

    /// GET <endpoint>?term=...&entity=song&limit=25
    pub fn request(&self, term: &str) -> RequestBuilder {
        let limit = SEARCH_LIMIT.to_string();
        self.http.get(self.endpoint.clone()).query(&[
            ("term", term),
            ("entity", SEARCH_ENTITY),
            ("limit", limit.as_str()),
        ])
    }

    async fn fetch(&self, term: &str) -> Result<Vec<TrackRecord>, SearchError> {
        let response = self.request(term).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

impl SearchBackend for CatalogClient {
    async fn search(&self, term: &str) -> SearchOutcome {
        let term = term.trim();
        if term.is_empty() {
            return SearchOutcome::Empty;
        }

        tracing::debug!(term, "Catalog search started");
        let outcome = SearchOutcome::from_result(self.fetch(term).await);

        match &outcome {
            SearchOutcome::Success(tracks) => {
                tracing::info!(term, tracks = tracks.len(), "Catalog search successful")
            }
            SearchOutcome::Empty => tracing::info!(term, "Catalog search returned no tracks"),
            SearchOutcome::Failure(e) => tracing::error!(term, error = %e, "Catalog search failed"),
        }

        outcome
    }
}
