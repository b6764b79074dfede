use std::time::Duration;

use reqwest::Client;
use scout_core::config::DEFAULT_USER_AGENT;
use scout_core::error::AppError;
use scout_core::traits::WebSearch;
use scraper::{Html, Selector};
use url::Url;

use crate::fetcher::{browser_headers, transport_error};

pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Web search through DuckDuckGo's HTML endpoint.
#[derive(Clone)]
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        Self::with_endpoint(DUCKDUCKGO_HTML_URL, DEFAULT_USER_AGENT, timeout)
    }

    pub fn with_endpoint(
        endpoint: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout,
        })
    }
}

impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, AppError> {
        let url = Url::parse_with_params(&self.endpoint, &[("q", query)])
            .map_err(|e| AppError::ConfigError(format!("Invalid search endpoint: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} from search endpoint",
                status.as_u16()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read search results: {e}")))?;
        let mut results = parse_results(&html);
        results.truncate(max_results);
        tracing::debug!(query, count = results.len(), "Web search results");
        Ok(results)
    }
}

/// Result URLs from a DuckDuckGo HTML page, in rank order, deduplicated.
pub fn parse_results(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a.result__a") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut seen = std::collections::HashSet::new();

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(decode_result_href)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Resolve a result link to its target.
///
/// Redirect links (`//duckduckgo.com/l/?uddg=...`) carry the target in the
/// `uddg` parameter; direct http(s) links are kept as they are.
fn decode_result_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute)
        .or_else(|_| Url::parse(DUCKDUCKGO_HTML_URL).and_then(|base| base.join(href)))
        .ok()?;

    if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
        return Url::parse(&target)
            .ok()
            .filter(|t| matches!(t.scheme(), "http" | "https"))
            .map(String::from);
    }

    let is_search_engine = url.host_str().is_some_and(|h| h.ends_with("duckduckgo.com"));
    (matches!(url.scheme(), "http" | "https") && !is_search_engine).then(|| url.to_string())
}
