//! Configuration management

use crate::error::{ErrorContext, LetterStatError, LetterStatResult};
use crate::types::{AnalysisConfig, ApiConfig, LetterStatConfig, RepoInfo, RepositoryConfig};

use std::path::Path;

/// Environment variables consulted for the access token, in priority order
pub const TOKEN_ENV_VARS: [&str; 2] = ["LETTERSTAT_ACCESS_TOKEN", "GITHUB_TOKEN"];

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: "lodash".to_string(),
            name: "lodash".to_string(),
            branch: None,
            root: String::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            access_token: None,
            timeout_seconds: 30,
            user_agent: "LetterStatisticsApp".to_string(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_concurrent_fetches: 8,
            max_depth: 64,
        }
    }
}

impl LetterStatConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LetterStatResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LetterStatError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> LetterStatResult<Self> {
        toml::from_str(content).map_err(|e| LetterStatError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })
    }

    pub fn to_toml_string(&self) -> LetterStatResult<String> {
        toml::to_string_pretty(self).map_err(|e| LetterStatError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LetterStatResult<()> {
        let content = self.to_toml_string()?;

        std::fs::write(path, content).map_err(|e| LetterStatError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Overlay the access token from the environment, if one is set
    pub fn apply_env_overrides(&mut self) {
        self.apply_token_lookup(|key| std::env::var(key).ok());
    }

    fn apply_token_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = TOKEN_ENV_VARS
            .iter()
            .filter_map(|key| lookup(key))
            .find(|value| !value.trim().is_empty())
        {
            self.api.access_token = Some(token);
        }
    }

    /// Repository identity described by this configuration
    pub fn repo_info(&self) -> RepoInfo {
        let info = RepoInfo::new(&self.repository.owner, &self.repository.name);
        match self.repository.branch.as_deref() {
            Some(branch) if !branch.is_empty() => info.with_branch(branch),
            _ => info,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> LetterStatResult<()> {
        if self.repository.owner.trim().is_empty() {
            return Err(invalid("repository.owner", "Repository owner must not be empty"));
        }

        if self.repository.name.trim().is_empty() {
            return Err(invalid("repository.name", "Repository name must not be empty"));
        }

        if self.analysis.max_concurrent_fetches == 0 {
            return Err(invalid(
                "analysis.max_concurrent_fetches",
                "max_concurrent_fetches must be greater than 0",
            ));
        }

        if self.analysis.max_depth == 0 {
            return Err(invalid(
                "analysis.max_depth",
                "max_depth must be greater than 0",
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(invalid(
                "api.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(invalid(
                "api.base_url",
                &format!("Invalid API base URL '{}': {}", self.api.base_url, e),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> LetterStatError {
    LetterStatError::Validation {
        message: message.to_string(),
        field: Some(field.to_string()),
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(&format!("Set {} to a valid value", field)),
    }
}
