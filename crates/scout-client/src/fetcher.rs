use std::time::Duration;

use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS,
};
use scout_core::config::DEFAULT_USER_AGENT;
use scout_core::error::AppError;
use scout_core::models::PageResponse;
use scout_core::traits::PageFetcher;
use url::Url;

/// Browser-like headers sent with every page request.
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Map a reqwest send error onto the shared error type.
pub(crate) fn transport_error(e: reqwest::Error, timeout: Duration) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout.as_secs())
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}

/// HTTP fetcher using reqwest.
///
/// Reports every HTTP status as a successful [`PageResponse`]; deciding
/// what counts as reachable is left to the caller. The timeout is set per
/// request so probes and full fetches can share one client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(user_agent: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(browser_headers())
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<PageResponse, AppError> {
        let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::HttpError(format!(
                "URL scheme '{}' is not allowed (only http/https)",
                parsed.scheme()
            )));
        }

        tracing::debug!(url, timeout_secs = timeout.as_secs(), "GET");
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        Ok(PageResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert!(headers.get(ACCEPT).unwrap().to_str().unwrap().contains("text/html"));
        assert_eq!(headers.get(UPGRADE_INSECURE_REQUESTS).unwrap(), "1");
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let fetcher = ReqwestFetcher::new().unwrap();
        let err = fetcher
            .fetch("file:///etc/passwd", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[tokio::test]
    async fn test_rejects_garbage_url() {
        let fetcher = ReqwestFetcher::new().unwrap();
        let err = fetcher
            .fetch("not a url", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[tokio::test]
    async fn test_success_status_and_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/careers")
            .match_header("user-agent", "scout-test/1.0")
            .match_header("upgrade-insecure-requests", "1")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<title>Careers</title>")
            .create_async()
            .await;
        let fetcher = ReqwestFetcher::with_user_agent("scout-test/1.0").unwrap();

        let page = fetcher
            .fetch(&format!("{}/careers", server.url()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<title>Careers</title>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_redirect_is_followed() {
        let mut server = mockito::Server::new_async().await;
        let _old = server
            .mock("GET", "/jobs")
            .with_status(301)
            .with_header("location", "/careers")
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/careers")
            .with_status(200)
            .with_body("Join our team")
            .create_async()
            .await;
        let fetcher = ReqwestFetcher::new().unwrap();

        let page = fetcher
            .fetch(&format!("{}/jobs", server.url()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "Join our team");
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(404)
            .with_body("gone")
            .create_async()
            .await;
        let fetcher = ReqwestFetcher::new().unwrap();

        let page = fetcher.fetch(&server.url(), Duration::from_secs(5)).await.unwrap();

        assert_eq!(page.status, 404);
        assert!(!page.is_reachable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = ReqwestFetcher::new().unwrap();

        let err = fetcher
            .fetch(&format!("http://{addr}/"), Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }
}
