//! HTTP clients for the search backend and the encyclopedia API.
//!
//! Both sit behind traits so the navigator, the search state and the REST proxy can be exercised
//! against in-memory fakes. The `reqwest` implementations decode responses into typed envelopes;
//! anything that does not match the expected shape is reported as an error rather than papered
//! over.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;
use wikinav_types::{Article, NonEmptyText, PageRef, SearchResult};

use crate::config::CoreConfig;
use crate::constants::USER_AGENT;
use crate::{NavError, NavResult};

/// The search backend consumed by the UI: `GET {base}/search?q=`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &NonEmptyText) -> NavResult<Vec<SearchResult>>;
}

/// The public encyclopedia API.
#[async_trait]
pub trait EncyclopediaApi: Send + Sync {
    /// Fetch the rendered article for `page`.
    async fn parse(&self, page: &PageRef) -> NavResult<Article>;

    /// Full-text search, at most `limit` hits.
    async fn search(&self, query: &NonEmptyText, limit: u32) -> NavResult<Vec<SearchResult>>;
}

/// Build the shared HTTP client with the configured timeout.
pub fn build_client(cfg: &CoreConfig) -> NavResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(cfg.http_timeout())
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

async fn get_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> NavResult<T> {
    let response = request.send().await?;
    let url = response.url().to_string();
    let status = response.status();
    tracing::debug!(%url, %status, "response received");

    if !status.is_success() {
        return Err(NavError::Status { status, url });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    results: Vec<SearchResult>,
}

/// [`SearchBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSearchBackend {
    /// `base_url` must end with `/` for `search` to be appended (see [`CoreConfig::new`]).
    pub fn new(client: reqwest::Client, base_url: &Url) -> NavResult<Self> {
        Ok(Self {
            client,
            endpoint: base_url.join("search")?,
        })
    }

    pub fn from_config(cfg: &CoreConfig, client: reqwest::Client) -> NavResult<Self> {
        Self::new(client, cfg.search_url())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &NonEmptyText) -> NavResult<Vec<SearchResult>> {
        tracing::debug!(endpoint = %self.endpoint, %query, "searching");
        let request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query.as_str())]);
        let envelope: SearchEnvelope = get_json(request).await?;
        Ok(envelope.results)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct ParseEnvelope {
    parse: Option<ParseBody>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ParseBody {
    title: String,
    text: ParseText,
}

#[derive(Debug, Deserialize)]
struct ParseText {
    #[serde(rename = "*")]
    html: String,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    query: Option<QueryBody>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    search: Vec<SearchResult>,
}

fn api_error(err: ApiErrorBody) -> NavError {
    NavError::Api {
        code: err.code,
        info: err.info,
    }
}

/// [`EncyclopediaApi`] for a MediaWiki action API endpoint such as
/// `https://en.wikipedia.org/w/api.php`.
#[derive(Debug, Clone)]
pub struct WikipediaApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl WikipediaApi {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn from_config(cfg: &CoreConfig, client: reqwest::Client) -> Self {
        Self::new(client, cfg.wiki_api_url().clone())
    }

    /// Query parameters for `action=parse` on `page`.
    pub fn parse_params(page: &PageRef) -> Vec<(&'static str, String)> {
        let (key, value) = match page {
            PageRef::Id(id) => ("pageid", id.to_string()),
            PageRef::Title(title) => ("page", title.to_string()),
        };
        vec![
            ("action", "parse".into()),
            (key, value),
            ("redirects", "1".into()),
            ("format", "json".into()),
            ("origin", "*".into()),
        ]
    }
}

#[async_trait]
impl EncyclopediaApi for WikipediaApi {
    async fn parse(&self, page: &PageRef) -> NavResult<Article> {
        tracing::debug!(endpoint = %self.endpoint, %page, "fetching article");
        let request = self
            .client
            .get(self.endpoint.clone())
            .query(&Self::parse_params(page));
        let envelope: ParseEnvelope = get_json(request).await?;
        article_from_envelope(envelope)
    }

    async fn search(&self, query: &NonEmptyText, limit: u32) -> NavResult<Vec<SearchResult>> {
        tracing::debug!(endpoint = %self.endpoint, %query, limit, "upstream search");
        let limit = limit.to_string();
        let request = self.client.get(self.endpoint.clone()).query(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query.as_str()),
            ("srlimit", limit.as_str()),
            ("format", "json"),
            ("origin", "*"),
        ]);
        let envelope: QueryEnvelope = get_json(request).await?;
        results_from_envelope(envelope)
    }
}

fn article_from_envelope(envelope: ParseEnvelope) -> NavResult<Article> {
    if let Some(err) = envelope.error {
        return Err(api_error(err));
    }
    let parse = envelope
        .parse
        .ok_or_else(|| NavError::UnexpectedShape("missing `parse` object".into()))?;
    Ok(Article::new(parse.title, parse.text.html))
}

fn results_from_envelope(envelope: QueryEnvelope) -> NavResult<Vec<SearchResult>> {
    if let Some(err) = envelope.error {
        return Err(api_error(err));
    }
    envelope
        .query
        .map(|query| query.search)
        .ok_or_else(|| NavError::UnexpectedShape("missing `query` object".into()))
}
