//! Link-header pagination
//!
//! GitHub paginates list endpoints and advertises the following page in a
//! `Link: <url>; rel="next"` header. [`Pages`] walks that chain one request
//! at a time so callers can stop as soon as they have what they need.

use super::{ApiClient, ApiRequest};
use crate::error::Result;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::LazyLock;
use tracing::debug;

static NEXT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("valid next-link regex")
});

/// Extract the `rel="next"` URL from a `Link` header value
pub fn next_link(header: &str) -> Option<String> {
    header
        .split(',')
        .find_map(|part| NEXT_LINK.captures(part))
        .map(|caps| caps[1].to_string())
}

/// One page of results
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page, in platform order
    pub items: Vec<T>,
    /// URL of the following page, if any
    pub next: Option<String>,
}

/// Lazy cursor over a paginated listing
///
/// Each call to [`Pages::next_page`] performs exactly one request. Once
/// the chain is exhausted the cursor stays exhausted.
pub struct Pages<'a, T> {
    client: &'a dyn ApiClient,
    pending: Option<ApiRequest>,
    fetched: usize,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Pages<'a, T> {
    /// Start a cursor at `first`
    pub fn new(client: &'a dyn ApiClient, first: ApiRequest) -> Self {
        Self {
            client,
            pending: Some(first),
            fetched: 0,
            _item: PhantomData,
        }
    }

    /// Number of pages fetched so far
    pub const fn fetched(&self) -> usize {
        self.fetched
    }

    /// Fetch the next page, or `None` once pagination is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Page<T>>> {
        let Some(request) = self.pending.take() else {
            return Ok(None);
        };

        let path = request.path.clone();
        let response = self.client.send(request).await?;
        self.fetched += 1;

        let items: Vec<T> = if response.body.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(response.body)?
        };
        let next = response.link.as_deref().and_then(next_link);
        debug!(%path, count = items.len(), has_next = next.is_some(), "fetched page");

        self.pending = next.clone().map(ApiRequest::get);
        Ok(Some(Page { items, next }))
    }

    /// Drain every remaining page into one vector
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page.items);
        }
        Ok(all)
    }
}
