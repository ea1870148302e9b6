//! Boundary to the remote graph service: search, one-hop expansion, and
//! saved-exploration persistence, consumed through an object-safe trait so
//! the controller can be exercised against a stub.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Exploration, GraphSnapshot, SearchResult},
    error::ErrorDetail,
};
use thiserror::Error;
use url::Url;

/// The service imposes no timeout of its own; expiry here surfaces as a
/// plain transport failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("graph service returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("transport failure talking to graph service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid graph service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("graph service url cannot be a base url")]
    CannotBeABase,
}

#[async_trait]
pub trait RetrievalGateway: Send + Sync {
    /// Full-text search. Empty or no-match input yields an empty list, not
    /// an error; term validation is the service's concern.
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, RetrievalError>;

    /// One-hop expansion of the given article title.
    async fn explore(&self, title: &str) -> Result<GraphSnapshot, RetrievalError>;

    async fn list_saved(&self) -> Result<Vec<Exploration>, RetrievalError>;

    async fn save(&self, name: &str, snapshot: &GraphSnapshot) -> Result<(), RetrievalError>;

    async fn delete(&self, id: &str) -> Result<(), RetrievalError>;
}

/// Raw encyclopedia search response proxied through by the service. The
/// hits live under `query.search`; the whole envelope may be absent on a
/// no-match response.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
struct SaveExplorationRequest<'a> {
    name: &'a str,
    #[serde(flatten)]
    graph: &'a GraphSnapshot,
}

/// HTTP implementation of [`RetrievalGateway`] against the graph service's
/// REST surface.
pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RetrievalError> {
        let base_url = Url::parse(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Join path segments onto the base url; segments are percent-encoded,
    /// so article titles with spaces or slashes stay one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RetrievalError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| RetrievalError::CannotBeABase)?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RetrievalError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = match response.json::<ErrorDetail>().await {
            Ok(body) => body.detail,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        Err(RetrievalError::Status { status, detail })
    }
}

#[async_trait]
impl RetrievalGateway for HttpGateway {
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, RetrievalError> {
        let mut url = self.endpoint(&["api", "search"])?;
        url.query_pairs_mut().append_pair("term", term);

        let response = self.http.get(url).send().await?;
        let envelope: SearchEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.query.map(|query| query.search).unwrap_or_default())
    }

    async fn explore(&self, title: &str) -> Result<GraphSnapshot, RetrievalError> {
        let mut url = self.endpoint(&["api", "explore", title])?;
        url.query_pairs_mut().append_pair("depth", "1");

        let response = self.http.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_saved(&self) -> Result<Vec<Exploration>, RetrievalError> {
        let url = self.endpoint(&["api", "explorations"])?;
        let response = self.http.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn save(&self, name: &str, snapshot: &GraphSnapshot) -> Result<(), RetrievalError> {
        let url = self.endpoint(&["api", "explorations"])?;
        let response = self
            .http
            .post(url)
            .json(&SaveExplorationRequest {
                name,
                graph: snapshot,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RetrievalError> {
        let url = self.endpoint(&["api", "explorations", id])?;
        let response = self.http.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
