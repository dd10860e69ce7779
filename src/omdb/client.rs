use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::{OmdbError, OmdbResult};
use super::oracle::MovieOracle;
use super::types::{MovieDetail, MovieSummary, SearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";
const USER_AGENT: &str = concat!("snurrio/", env!("CARGO_PKG_VERSION"));

/// Catalog message for an unknown search term. Not an error condition.
const NOT_FOUND_MESSAGE: &str = "Movie not found!";

pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> OmdbResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    fn api_key(&self) -> OmdbResult<&str> {
        self.api_key.as_deref().ok_or(OmdbError::MissingApiKey)
    }

    fn url(&self, query: &str) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.base_url, sep, query)
    }

    pub(crate) fn search_url(&self, api_key: &str, term: &str, page: u32) -> String {
        self.url(&format!(
            "apikey={}&s={}&type=movie&page={}",
            urlencoding::encode(api_key),
            urlencoding::encode(term),
            page
        ))
    }

    pub(crate) fn lookup_url(&self, api_key: &str, id: &str) -> String {
        self.url(&format!(
            "apikey={}&i={}&plot=short",
            urlencoding::encode(api_key),
            urlencoding::encode(id)
        ))
    }

    /// Transport errors drop their URL: it carries the API key and these
    /// errors end up in log lines.
    async fn get_body(&self, url: &str) -> OmdbResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| OmdbError::Request(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OmdbError::Api {
                status_code: status.as_u16(),
                message,
            });
        }
        response
            .text()
            .await
            .map_err(|e| OmdbError::Request(e.without_url()))
    }
}

#[async_trait]
impl MovieOracle for OmdbClient {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, term: &str, page: u32) -> OmdbResult<Vec<MovieSummary>> {
        let url = self.search_url(self.api_key()?, term, page);
        debug!(term = %term, page = page, "OMDb search");
        let body = self.get_body(&url).await?;
        parse_search_body(&body)
    }

    async fn lookup(&self, id: &str) -> OmdbResult<Option<MovieDetail>> {
        let url = self.lookup_url(self.api_key()?, id);
        debug!(id = %id, "OMDb lookup");
        let body = self.get_body(&url).await?;
        parse_lookup_body(&body)
    }
}

/// A `"False"` response becomes `NoResults`; a `"True"` one without a
/// result list is an empty page.
pub fn parse_search_body(body: &str) -> OmdbResult<Vec<MovieSummary>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    if !response.is_success() {
        let message = response
            .error
            .unwrap_or_else(|| NOT_FOUND_MESSAGE.to_string());
        return Err(OmdbError::NoResults(message));
    }
    Ok(response.search.unwrap_or_default())
}

/// Unknown ids (`"Response": "False"`) resolve to `None`.
pub fn parse_lookup_body(body: &str) -> OmdbResult<Option<MovieDetail>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let found = value
        .get("Response")
        .and_then(|r| r.as_str())
        .map(|r| r.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !found {
        if let Some(err) = value.get("Error").and_then(|e| e.as_str()) {
            debug!("OMDb lookup miss: {}", err);
        }
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}
