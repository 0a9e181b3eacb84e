//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type LetterStatResult<T> = Result<T, LetterStatError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for letterstat
#[derive(Error, Debug)]
pub enum LetterStatError {
    /// Network, HTTP or authentication failure reported by a collaborator
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// A directory path or content reference did not resolve
    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LetterStatError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            LetterStatError::Transport { context, .. } => Some(context),
            LetterStatError::NotFound { context, .. } => Some(context),
            LetterStatError::Config { context, .. } => Some(context),
            LetterStatError::Validation { context, .. } => Some(context),
            LetterStatError::Internal { context, .. } => Some(context),
            LetterStatError::Io(_) | LetterStatError::Serialization(_) => None,
        }
    }

    /// Whether rerunning the whole command may succeed.
    ///
    /// Nothing in the crawl retries on its own; this only drives the hint shown to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LetterStatError::Transport { .. })
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            LetterStatError::Config { .. } | LetterStatError::Validation { .. } => 2,
            LetterStatError::NotFound { .. } => 3,
            LetterStatError::Transport { .. } => 4,
            _ => 1,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            LetterStatError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            LetterStatError::Config { .. } | LetterStatError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            LetterStatError::Transport { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Transport error (rerun may succeed)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! transport_error {
    ($msg:expr, $component:expr) => {
        $crate::LetterStatError::Transport {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::LetterStatError::Transport {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::LetterStatError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::LetterStatError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::LetterStatError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the repository, branch and path")
                .with_suggestion("Check if the resource exists and is accessible"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(transport_error!("connection reset", "test").is_retryable());
        assert!(!not_found_error!("lib/", "test").is_retryable());
        assert!(!validation_error!("bad", "field", "test").is_retryable());
    }

    #[test]
    fn test_exit_codes_distinguish_kinds() {
        assert_eq!(config_error!("bad", "test").exit_code(), 2);
        assert_eq!(not_found_error!("x", "test").exit_code(), 3);
        assert_eq!(transport_error!("x", "test").exit_code(), 4);
        let io = LetterStatError::from(std::io::Error::other("boom"));
        assert_eq!(io.exit_code(), 1);
        assert!(io.context().is_none());
    }

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("walker")
            .with_operation("discover")
            .with_metadata("path", "src")
            .with_suggestion("try again");

        assert_eq!(context.component, "walker");
        assert_eq!(context.operation.as_deref(), Some("discover"));
        assert_eq!(context.metadata.get("path").map(String::as_str), Some("src"));
        assert_eq!(context.recovery_suggestions, vec!["try again".to_string()]);
        assert!(!context.error_id.is_empty());
    }
}
