//! HTTP fetcher
//!
//! All network I/O for a crawl goes through here. A fetch never
//! returns an `Err`; every outcome is classified into a [`FetchResult`]
//! so the orchestrator can record broken links instead of aborting the
//! job on the first bad URL.

use reqwest::Client;
use std::time::Duration;

/// Result of fetching one URL
#[derive(Debug)]
pub enum FetchResult {
    /// Fetched successfully with a 2xx status
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value, empty when absent
        content_type: String,
        /// Response body
        body: Vec<u8>,
    },

    /// The server answered with a client error (404 and friends)
    NotFound {
        /// The HTTP status code
        status_code: u16,
    },

    /// The server answered with a 5xx error
    ServerError {
        /// The HTTP status code
        status_code: u16,
    },

    /// The request timed out
    Timeout,

    /// Connection-level failure
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// True for every outcome that marks the link broken
    pub fn is_broken(&self) -> bool {
        !matches!(self, FetchResult::Success { .. })
    }
}

/// Builds the HTTP client shared by a crawl job
pub fn build_http_client(user_agent: &str, timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success |
/// | 4xx | NotFound |
/// | 5xx | ServerError |
/// | Timeout | Timeout |
/// | Connection failure | NetworkError |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            if e.is_timeout() {
                return FetchResult::Timeout;
            }
            return FetchResult::NetworkError {
                error: e.to_string(),
            };
        }
    };

    let status = response.status();
    if status.is_client_error() {
        return FetchResult::NotFound {
            status_code: status.as_u16(),
        };
    }
    if !status.is_success() {
        return FetchResult::ServerError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        },
        Err(e) => {
            if e.is_timeout() {
                FetchResult::Timeout
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> Client {
        build_http_client("linkmap-test/0.1", 5).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let result = fetch_url(&test_client(), &format!("{}/page", server.uri())).await;
        match result {
            FetchResult::Success {
                status_code,
                content_type,
                body,
                ..
            } => {
                assert_eq!(status_code, 200);
                assert!(content_type.starts_with("text/html"));
                assert_eq!(body, b"<html></html>");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_404_is_broken() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetch_url(&test_client(), &format!("{}/gone", server.uri())).await;
        assert!(result.is_broken());
        assert!(matches!(result, FetchResult::NotFound { status_code: 404 }));
    }

    #[tokio::test]
    async fn test_fetch_500_is_broken() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = fetch_url(&test_client(), &format!("{}/err", server.uri())).await;
        assert!(matches!(result, FetchResult::ServerError { status_code: 503 }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 1 is never listening
        let result = fetch_url(&test_client(), "http://127.0.0.1:1/x").await;
        assert!(matches!(result, FetchResult::NetworkError { .. }));
    }

    #[test]
    fn test_build_client() {
        assert!(build_http_client("agent/1.0", 30).is_ok());
    }
}
