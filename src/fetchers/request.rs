use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

use super::ContentFetcher;
use crate::error::TransformError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Plain HTTP fetcher: default redirect policy, no cache, no retry.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransformError> {
        let timeout = timeout.unwrap_or(Duration::from_secs(30));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransformError::SourceUnreachable {
                status: None,
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for RequestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, TransformError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Error fetching {}: {}", url, e);
            TransformError::SourceUnreachable {
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} returned {}", url, status);
            return Err(TransformError::SourceUnreachable {
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| TransformError::SourceUnreachable {
                status: Some(status.as_u16()),
                reason: format!("Failed to read response body: {}", e),
            })?;
        debug!("Fetched {} bytes from {}", html.len(), url);
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/recipe")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><h1>Soup</h1></body></html>")
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(None).unwrap();
        let body = fetcher
            .fetch(&format!("{}/recipe", server.url()))
            .await
            .unwrap();

        assert!(body.contains("<h1>Soup</h1>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let mut server = Server::new_async().await;
        let _old = server
            .mock("GET", "/old")
            .with_status(301)
            .with_header("location", &format!("{}/new", server.url()))
            .create_async()
            .await;
        let _new = server
            .mock("GET", "/new")
            .with_status(200)
            .with_body("moved here")
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(None).unwrap();
        let body = fetcher.fetch(&format!("{}/old", server.url())).await.unwrap();
        assert_eq!(body, "moved here");
    }

    #[tokio::test]
    async fn test_fetch_404_is_source_unreachable() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = RequestFetcher::new(None).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransformError::SourceUnreachable {
                status: Some(404),
                reason: "Not Found".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_transport_error_has_no_status() {
        let fetcher = RequestFetcher::new(Some(Duration::from_secs(2))).unwrap();
        // Port 9 (discard) is essentially never listening on localhost
        let err = fetcher.fetch("http://127.0.0.1:9/recipe").await.unwrap_err();

        match err {
            TransformError::SourceUnreachable { status, .. } => assert_eq!(status, None),
            other => panic!("Expected SourceUnreachable, got {:?}", other),
        }
    }
}
