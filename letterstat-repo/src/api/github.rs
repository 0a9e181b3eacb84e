//! GitHub contents API client
//!
//! Lists directories through `GET /repos/{owner}/{repo}/contents/{path}` and reads files through
//! the `download_url` each listing entry carries.

use async_trait::async_trait;
use letterstat_core::{
    ContentFetcher, DirectoryLister, ErrorContext, LetterStatError, LetterStatResult, RepoInfo,
    RepositoryEntry,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{create_http_client, handle_response_error, ApiClientConfig};

/// GitHub API client bound to one repository
pub struct GitHubContentsClient {
    client: reqwest::Client,
    config: ApiClientConfig,
    repo: RepoInfo,
}

/// One item of a contents listing
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubContentItem {
    pub(crate) name: String,
    pub(crate) path: String,
    #[serde(rename = "type")]
    pub(crate) item_type: String,
    pub(crate) download_url: Option<String>,
}

/// The contents endpoint answers with an array for directories and a single object for files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GitHubContentsResponse {
    Listing(Vec<GitHubContentItem>),
    Single(GitHubContentItem),
}

impl GitHubContentItem {
    /// Convert into a listing entry; symlinks and submodules yield `None`
    pub(crate) fn into_entry(self) -> Option<RepositoryEntry> {
        match self.item_type.as_str() {
            "file" => Some(RepositoryEntry::file(
                &self.name,
                &self.path,
                self.download_url.as_deref(),
            )),
            "dir" => Some(RepositoryEntry::directory(&self.name, &self.path)),
            other => {
                debug!(path = %self.path, item_type = other, "Skipping unsupported entry type");
                None
            }
        }
    }
}

impl GitHubContentsResponse {
    pub(crate) fn into_entries(self, path: &str) -> LetterStatResult<Vec<RepositoryEntry>> {
        match self {
            GitHubContentsResponse::Listing(items) => {
                Ok(items.into_iter().filter_map(GitHubContentItem::into_entry).collect())
            }
            GitHubContentsResponse::Single(item) => Err(LetterStatError::Validation {
                message: format!("'{}' is a {}, not a directory", path, item.item_type),
                field: Some("path".to_string()),
                context: ErrorContext::new("github_api_client")
                    .with_operation("list_directory")
                    .with_suggestion("Point the root at a directory"),
            }),
        }
    }
}

impl GitHubContentsClient {
    /// Create a new GitHub API client for `repo`
    pub fn new(config: ApiClientConfig, repo: RepoInfo) -> LetterStatResult<Self> {
        let client = create_http_client(&config)?;

        info!(
            base_url = %config.base_url,
            repo = %repo.full_name(),
            authenticated = config.access_token.is_some(),
            "Created GitHub API client"
        );

        Ok(Self {
            client,
            config,
            repo,
        })
    }

    /// Create authorization headers
    fn create_auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref token) = self.config.access_token {
            if let Ok(auth_value) =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            {
                headers.insert(reqwest::header::AUTHORIZATION, auth_value);
            }
        }

        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        headers
    }

    /// Endpoint (relative to the API base) listing `path`
    pub(crate) fn contents_endpoint(&self, path: &str) -> String {
        let mut endpoint = format!(
            "repos/{}/{}/contents",
            urlencoding::encode(&self.repo.owner),
            urlencoding::encode(&self.repo.name)
        );

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            endpoint.push('/');
            endpoint.push_str(&urlencoding::encode(segment));
        }

        if let Some(branch) = &self.repo.branch {
            endpoint.push_str("?ref=");
            endpoint.push_str(&urlencoding::encode(branch));
        }

        endpoint
    }

    /// Absolute URL for a content reference; relative references resolve against the API base
    pub(crate) fn resolve_content_url(&self, content_ref: &str) -> LetterStatResult<url::Url> {
        match url::Url::parse(content_ref) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = format!("{}/", self.config.base_url.trim_end_matches('/'));
                url::Url::parse(&base)
                    .and_then(|base| base.join(content_ref.trim_start_matches('/')))
                    .map_err(|e| invalid_reference(content_ref, e))
            }
            Err(e) => Err(invalid_reference(content_ref, e)),
        }
    }

    /// Make a GET request and fail on any non-success status
    async fn get_request(&self, url: &str, operation: &str) -> LetterStatResult<reqwest::Response> {
        debug!("Making GitHub request to: {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.create_auth_headers())
            .send()
            .await
            .map_err(|e| LetterStatError::Transport {
                message: format!("Failed to make request to GitHub: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_api_client")
                    .with_operation(operation)
                    .with_metadata("url", url),
            })?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, operation).await);
        }

        Ok(response)
    }
}

#[async_trait]
impl DirectoryLister for GitHubContentsClient {
    async fn list_directory(&self, path: &str) -> LetterStatResult<Vec<RepositoryEntry>> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.contents_endpoint(path)
        );

        let response = self.get_request(&url, "list_directory").await?;

        let contents: GitHubContentsResponse =
            response.json().await.map_err(|e| LetterStatError::Transport {
                message: format!("Failed to parse directory listing: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_api_client")
                    .with_operation("list_directory")
                    .with_metadata("path", path),
            })?;

        let entries = contents.into_entries(path)?;
        debug!(path = %path, entries = entries.len(), "Listed directory");
        Ok(entries)
    }
}

#[async_trait]
impl ContentFetcher for GitHubContentsClient {
    async fn fetch_content(&self, content_ref: &str) -> LetterStatResult<String> {
        let url = self.resolve_content_url(content_ref)?;

        let response = self.get_request(url.as_str(), "fetch_content").await?;

        response.text().await.map_err(|e| LetterStatError::Transport {
            message: format!("Failed to read content of {}: {}", content_ref, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_api_client").with_operation("fetch_content"),
        })
    }
}

fn invalid_reference(content_ref: &str, e: url::ParseError) -> LetterStatError {
    LetterStatError::Validation {
        message: format!("Invalid content reference '{}': {}", content_ref, e),
        field: Some("content_ref".to_string()),
        context: ErrorContext::new("github_api_client").with_operation("resolve_content_url"),
    }
}
