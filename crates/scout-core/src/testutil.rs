//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing assertions on
//! recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::AppError;
use crate::models::PageResponse;
use crate::pacing::PacingConfig;
use crate::traits::{ModelClient, PageFetcher, WebSearch};

/// Config with pauses disabled so tests run instantly.
pub fn test_config() -> SearchConfig {
    SearchConfig {
        pacing: PacingConfig::disabled(),
        ..SearchConfig::default()
    }
}

pub fn careers_html(body: &str) -> String {
    format!("<html><head><title>Careers</title></head><body>{body}</body></html>")
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher keyed by URL. Unknown URLs answer 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, Result<PageResponse, AppError>>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub timeouts: Arc<Mutex<Vec<Duration>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, status: u16, body: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(PageResponse::new(status, body)));
        self
    }

    pub fn with_error(self, url: &str, error: AppError) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error));
        self
    }

    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Timeout passed with each fetch, in call order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }
}

impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<PageResponse, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.timeouts.lock().unwrap().push(timeout);
        let mut pages = self.pages.lock().unwrap();
        match pages.remove(url) {
            Some(Ok(page)) => {
                pages.insert(url.to_string(), Ok(page.clone()));
                Ok(page)
            }
            // Errors are answered once; later fetches of the URL get a 404.
            Some(Err(e)) => Err(e),
            None => Ok(PageResponse::new(404, "Not Found")),
        }
    }
}

// ---------------------------------------------------------------------------
// MockModel
// ---------------------------------------------------------------------------

/// Mock model answering by prompt substring; the first matching rule wins.
///
/// Prompts matching no rule get the fallback reply.
#[derive(Clone)]
pub struct MockModel {
    rules: Arc<Mutex<Vec<(String, Result<String, AppError>)>>>,
    fallback: Arc<Mutex<Option<String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockModel {
    /// Model that answers `reply` to everything.
    pub fn replying(reply: &str) -> Self {
        Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            fallback: Arc::new(Mutex::new(Some(reply.to_string()))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Model that fails every call with a network error.
    pub fn failing() -> Self {
        Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            fallback: Arc::new(Mutex::new(None)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn when(self, prompt_contains: &str, reply: &str) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((prompt_contains.to_string(), Ok(reply.to_string())));
        self
    }

    /// Fails once for prompts containing `prompt_contains`.
    pub fn failing_when(self, prompt_contains: &str, error: AppError) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((prompt_contains.to_string(), Err(error)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ModelClient for MockModel {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let mut rules = self.rules.lock().unwrap();
        if let Some(idx) = rules.iter().position(|(needle, _)| prompt.contains(needle)) {
            if let Ok(reply) = &rules[idx].1 {
                return Ok(reply.clone());
            }
            return rules.remove(idx).1;
        }

        match self.fallback.lock().unwrap().as_ref() {
            Some(reply) => Ok(reply.clone()),
            None => Err(AppError::NetworkError("model backend unreachable".into())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSearch
// ---------------------------------------------------------------------------

/// Mock web search keyed by exact query. Unknown queries return nothing.
#[derive(Clone, Default)]
pub struct MockSearch {
    results: Arc<Mutex<HashMap<String, Result<Vec<String>, AppError>>>>,
    pub queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(self, query: &str, urls: &[&str]) -> Self {
        self.results.lock().unwrap().insert(
            query.to_string(),
            Ok(urls.iter().map(|u| u.to_string()).collect()),
        );
        self
    }

    pub fn with_error(self, query: &str, error: AppError) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(query.to_string(), Err(error));
        self
    }
}

impl WebSearch for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, AppError> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.results.lock().unwrap().remove(query) {
            Some(Ok(urls)) => Ok(urls.into_iter().take(max_results).collect()),
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}
