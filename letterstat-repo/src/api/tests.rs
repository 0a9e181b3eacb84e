//! Tests for API clients

use super::github::GitHubContentsResponse;
use super::*;
use letterstat_core::{ContentFetcher, DirectoryLister, EntryKind, RepoInfo};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn client(repo: RepoInfo) -> GitHubContentsClient {
    GitHubContentsClient::new(ApiClientConfig::from(&ApiConfig::default()), repo).unwrap()
}

/// Serve one canned HTTP response on a local port and return the base URL
async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{}", addr)
}

fn local_client(base_url: String) -> GitHubContentsClient {
    let config = ApiClientConfig {
        base_url,
        ..ApiClientConfig::from(&ApiConfig::default())
    };
    GitHubContentsClient::new(config, RepoInfo::new("lodash", "lodash")).unwrap()
}

#[test]
fn test_default_api_client_config() {
    let config = ApiClientConfig::from(&ApiConfig::default());
    assert_eq!(config.base_url, "https://api.github.com");
    assert_eq!(config.access_token, None);
    assert_eq!(config.user_agent, "LetterStatisticsApp");
    assert_eq!(config.timeout_seconds, 30);
}

#[test]
fn test_config_from_api_settings() {
    let api = ApiConfig {
        base_url: "https://github.example.com/api/v3".to_string(),
        access_token: Some("secret".to_string()),
        timeout_seconds: 5,
        user_agent: "letterstat-test".to_string(),
    };

    let config = ApiClientConfig::from(&api);
    assert_eq!(config.base_url, "https://github.example.com/api/v3");
    assert_eq!(config.access_token.as_deref(), Some("secret"));
    assert_eq!(config.timeout_seconds, 5);
}

#[tokio::test]
async fn test_http_client_creation() {
    assert!(create_http_client(&ApiClientConfig::from(&ApiConfig::default())).is_ok());

    let bad = ApiClientConfig {
        user_agent: "bad\nagent".to_string(),
        ..ApiClientConfig::from(&ApiConfig::default())
    };
    assert!(matches!(
        create_http_client(&bad),
        Err(letterstat_core::LetterStatError::Config { .. })
    ));
}

#[tokio::test]
async fn test_list_directory_maps_404_to_not_found() {
    let base = serve_once("404 Not Found", r#"{"message":"Not Found"}"#).await;

    let result = local_client(base).list_directory("missing").await;
    assert!(matches!(
        result,
        Err(letterstat_core::LetterStatError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_fetch_content_maps_401_to_transport() {
    let base = serve_once("401 Unauthorized", r#"{"message":"Bad credentials"}"#).await;
    let client = local_client(base.clone());

    let result = client.fetch_content(&format!("{}/raw/a.js", base)).await;
    match result {
        Err(error @ letterstat_core::LetterStatError::Transport { .. }) => {
            assert!(error.is_retryable());
            assert!(error.to_string().contains("401"));
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_directory_decodes_listing() {
    let base = serve_once(
        "200 OK",
        r#"[{"name": "a.js", "path": "src/a.js", "type": "file", "download_url": "https://raw.example/a.js"}]"#,
    )
    .await;

    let entries = local_client(base).list_directory("src").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].fetchable_ref(), Some("https://raw.example/a.js"));
}

#[tokio::test]
async fn test_contents_endpoint() {
    let root = client(RepoInfo::new("lodash", "lodash"));
    assert_eq!(root.contents_endpoint(""), "repos/lodash/lodash/contents");
    assert_eq!(
        root.contents_endpoint("src/.internal"),
        "repos/lodash/lodash/contents/src/.internal"
    );

    let branched = client(RepoInfo::new("lodash", "lodash").with_branch("feature/x"));
    assert_eq!(
        branched.contents_endpoint("my dir/"),
        "repos/lodash/lodash/contents/my%20dir?ref=feature%2Fx"
    );
}

#[tokio::test]
async fn test_resolve_content_url() {
    let c = client(RepoInfo::new("lodash", "lodash"));

    let absolute = c
        .resolve_content_url("https://raw.githubusercontent.com/lodash/lodash/main/lodash.js")
        .unwrap();
    assert_eq!(absolute.host_str(), Some("raw.githubusercontent.com"));

    let relative = c.resolve_content_url("/repos/lodash/lodash/contents/a.js").unwrap();
    assert_eq!(
        relative.as_str(),
        "https://api.github.com/repos/lodash/lodash/contents/a.js"
    );

    assert!(c.resolve_content_url("http://[::1").is_err());
}

#[test]
fn test_listing_fixture_maps_entry_kinds() {
    let json = r#"[
        {"name": "lodash.js", "path": "lodash.js", "type": "file",
         "download_url": "https://raw.githubusercontent.com/lodash/lodash/main/lodash.js"},
        {"name": "test", "path": "test", "type": "dir", "download_url": null},
        {"name": "vendor", "path": "vendor", "type": "submodule", "download_url": null},
        {"name": "link.js", "path": "link.js", "type": "symlink",
         "download_url": "https://raw.githubusercontent.com/lodash/lodash/main/link.js"}
    ]"#;

    let response: GitHubContentsResponse = serde_json::from_str(json).unwrap();
    let entries = response.into_entries("").unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(
        entries[0].fetchable_ref(),
        Some("https://raw.githubusercontent.com/lodash/lodash/main/lodash.js")
    );
    assert_eq!(entries[1].kind, EntryKind::Directory);
    assert_eq!(entries[1].path, "test");
    assert_eq!(entries[1].content_ref, None);
}

#[test]
fn test_single_file_response_is_rejected_as_listing() {
    let json = r#"{"name": "package.json", "path": "package.json", "type": "file",
                   "download_url": "https://raw.githubusercontent.com/x/y/main/package.json",
                   "size": 10, "sha": "abc"}"#;

    let response: GitHubContentsResponse = serde_json::from_str(json).unwrap();
    assert!(matches!(
        response.into_entries("package.json"),
        Err(letterstat_core::LetterStatError::Validation { .. })
    ));
}

#[test]
fn test_status_error_mapping() {
    use letterstat_core::LetterStatError;
    use reqwest::StatusCode;

    let missing = status_error(StatusCode::NOT_FOUND, "https://api/x", "", "list_directory");
    assert!(matches!(missing, LetterStatError::NotFound { .. }));

    let unauthorized = status_error(
        StatusCode::UNAUTHORIZED,
        "https://api/x",
        "Bad credentials",
        "list_directory",
    );
    match unauthorized {
        LetterStatError::Transport {
            message, context, ..
        } => {
            assert!(message.contains("401"));
            assert!(message.contains("Bad credentials"));
            assert_eq!(context.recovery_suggestions, vec!["Check your access token"]);
        }
        other => panic!("expected transport error, got {:?}", other),
    }

    let limited = status_error(StatusCode::FORBIDDEN, "https://api/x", "", "fetch_content");
    assert!(limited.is_retryable());
    assert!(limited.to_string().contains("Forbidden"));
}
