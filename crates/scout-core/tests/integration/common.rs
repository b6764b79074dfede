use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scout_core::error::AppError;
use scout_core::models::PageResponse;
use scout_core::pacing::PacingConfig;
use scout_core::{ModelClient, PageFetcher, SearchConfig, WebSearch};

pub fn fast_config() -> SearchConfig {
    SearchConfig {
        pacing: PacingConfig::disabled(),
        ..SearchConfig::default()
    }
}

/// Serves fixed pages; everything else is a 404.
#[derive(Clone, Default)]
pub struct StaticSite {
    pages: Arc<HashMap<String, String>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl StaticSite {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            ),
            requested: Arc::default(),
        }
    }
}

impl PageFetcher for StaticSite {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<PageResponse, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        Ok(match self.pages.get(url) {
            Some(body) => PageResponse::new(200, body.clone()),
            None => PageResponse::new(404, "Not Found"),
        })
    }
}

/// Model answering by prompt substring, erroring when nothing matches.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    replies: Arc<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(replies: &[(&str, &str)]) -> Self {
        Self {
            replies: Arc::new(
                replies
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

impl ModelClient for ScriptedModel {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, AppError> {
        self.replies
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .ok_or_else(|| AppError::NetworkError("no scripted reply".into()))
    }
}

/// Search engine that never finds anything.
#[derive(Clone, Default)]
pub struct NoResults;

impl WebSearch for NoResults {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<String>, AppError> {
        Ok(Vec::new())
    }
}
