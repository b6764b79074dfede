use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::models::PageResponse;

/// Issues a single HTTP GET.
///
/// Any HTTP status is a successful fetch; only transport failures
/// (timeout, DNS, refused connection) are errors.
pub trait PageFetcher: Send + Sync + Clone {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<PageResponse, AppError>> + Send;
}

/// Sends a prompt to a text-generation backend and returns its raw reply.
pub trait ModelClient: Send + Sync + Clone {
    fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Runs a web search and returns result URLs in rank order.
pub trait WebSearch: Send + Sync + Clone {
    fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> impl Future<Output = Result<Vec<String>, AppError>> + Send;
}
