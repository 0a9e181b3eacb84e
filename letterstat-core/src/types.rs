//! Core data type definitions

use serde::{Deserialize, Serialize};

/// Kind of an item returned by a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One item of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    /// File or directory name (last path segment)
    pub name: String,
    /// Locator for the raw content; only meaningful for files
    pub content_ref: Option<String>,
    pub kind: EntryKind,
    /// Path relative to the repository root
    pub path: String,
}

impl RepositoryEntry {
    pub fn file(name: &str, path: &str, content_ref: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            content_ref: content_ref.map(str::to_string),
            kind: EntryKind::File,
            path: path.to_string(),
        }
    }

    pub fn directory(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            content_ref: None,
            kind: EntryKind::Directory,
            path: path.to_string(),
        }
    }

    /// Content reference, treating an empty string as absent
    pub fn fetchable_ref(&self) -> Option<&str> {
        self.content_ref.as_deref().filter(|r| !r.is_empty())
    }
}

/// Identity of the repository being analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub owner: String,
    pub name: String,
    /// Git ref to read from; the default branch when unset
    pub branch: Option<String>,
}

impl RepoInfo {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = Some(branch.to_string());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Configuration information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterStatConfig {
    pub repository: RepositoryConfig,
    pub api: ApiConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
    pub branch: Option<String>,
    /// Directory discovery starts from; empty for the repository root
    pub root: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Upper bound on content fetches in flight
    pub max_concurrent_fetches: usize,
    /// Deepest directory level the walker will list (root = 0)
    pub max_depth: usize,
}
