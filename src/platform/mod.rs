//! Platform access for GitHub
//!
//! Everything the bot reads or writes goes through [`ApiClient`], a
//! single-method request interface. Production uses [`HttpClient`]; tests
//! inject a scripted fake.

mod github;
mod http;
mod pagination;

pub use github::{GitHub, MergeRequest};
pub use http::HttpClient;
pub use pagination::{Page, Pages, next_link};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// HTTP method subset used by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// A single platform request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// API path (`/repos/...`) or absolute URL
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Build a request with no query or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful platform response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Parsed JSON body (`Null` when empty)
    pub body: Value,
    /// Raw `Link` header, if present
    pub link: Option<String>,
}

impl ApiResponse {
    /// Response carrying `body` and no `Link` header
    pub const fn ok(body: Value) -> Self {
        Self { body, link: None }
    }

    /// Attach a `Link` header
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Authenticated request executor
///
/// Implementations return [`crate::error::Error::Http`] for non-2xx
/// responses so callers can branch on the status code.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Execute one request
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
