//! reqwest-backed [`ApiClient`]

use super::{ApiClient, ApiRequest, ApiResponse, Method};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, LINK};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Authenticated GitHub REST client
pub struct HttpClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl HttpClient {
    /// Create a client for `base_url` (e.g. `https://api.github.com`)
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid API base {base_url:?}: {e}")))?;
        // Url::join replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("ballot-box/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    /// Absolute URLs (pagination links, `statuses_url`) are used verbatim
    fn resolve(&self, path: &str) -> Result<Url> {
        let resolved = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)
        } else {
            self.base_url.join(path.trim_start_matches('/'))
        };
        resolved.map_err(|e| Error::GitHubApi(format!("invalid request URL {path:?}: {e}")))
    }

    /// The token is only sent to the configured API host
    fn is_api_origin(&self, url: &Url) -> bool {
        url.origin() == self.base_url.origin()
    }
}

const fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
    }
}

/// Pull GitHub's `message` field out of an error body, falling back to the raw text
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| text.trim().to_string())
}

#[async_trait]
impl ApiClient for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.resolve(&request.path)?;
        debug!(method = %request.method, %url, "sending request");

        let authorized = self.is_api_origin(&url);
        let mut builder = self
            .http
            .request(to_reqwest(request.method), url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if authorized {
            builder = builder.bearer_auth(&self.token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("{} {} failed: {e}", request.method, request.path)))?;

        let status = response.status();
        let link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let text = response
            .text()
            .await
            .map_err(|e| Error::GitHubApi(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), path = %request.path, "request failed");
            return Err(Error::Http {
                status: status.as_u16(),
                path: request.path,
                message: error_message(&text),
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(ApiResponse { body, link })
    }
}
