//! API clients for accessing remote repositories
//!
//! Directory listings and raw file content are read straight from the hosting service's HTTP API,
//! without cloning.

use letterstat_core::{ApiConfig, ErrorContext, LetterStatError, LetterStatResult};

pub mod github;

#[cfg(test)]
mod tests;

pub use github::GitHubContentsClient;

/// Configuration for API clients
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Access token for authentication
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            access_token: api.access_token.clone(),
            timeout_seconds: api.timeout_seconds,
            user_agent: api.user_agent.clone(),
        }
    }
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> LetterStatResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            LetterStatError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| LetterStatError::Transport {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// Map a non-success status to a crawl error. 404 becomes `NotFound`, everything else is a
/// transport failure.
pub(crate) fn status_error(
    status: reqwest::StatusCode,
    url: &str,
    body: &str,
    operation: &str,
) -> LetterStatError {
    if status == reqwest::StatusCode::NOT_FOUND {
        return LetterStatError::NotFound {
            resource: url.to_string(),
            context: ErrorContext::new("api_client")
                .with_operation(operation)
                .with_suggestion("Repository, branch or path not found or not accessible"),
        };
    }

    LetterStatError::Transport {
        message: format!(
            "HTTP {} error for {}: {}",
            status.as_u16(),
            url,
            if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error")
            } else {
                body
            }
        ),
        source: None,
        context: ErrorContext::new("api_client")
            .with_operation(operation)
            .with_metadata("status", &status.as_u16().to_string())
            .with_suggestion(match status.as_u16() {
                401 => "Check your access token",
                403 => "Check repository permissions or rate limits",
                _ => "Check network connectivity and API status",
            }),
    }
}

/// Helper function to handle HTTP response errors
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> LetterStatError {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();

    status_error(status, &url, &body, operation)
}
