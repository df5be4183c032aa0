//! Error types for tenancy-access
//!
//! This module defines the error hierarchy used throughout the crate.
//! Resolution errors are library-style `thiserror` enums that callers map
//! to their own boundary responses (see [`AccessError::http_status`]).

use crate::access::ScopeKind;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),

    #[error("Access resolution error: {0}")]
    Access(#[from] AccessError),

    #[error("Directory error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised while resolving a user's access to a resource
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("{scope} '{id}' not found")]
    NotFound { scope: ScopeKind, id: String },

    #[error("user '{user_id}' is not a member of {scope} '{id}' or any of its ancestors")]
    Forbidden {
        user_id: String,
        scope: ScopeKind,
        id: String,
    },

    #[error("invalid scope '{value}', expected one of: {allowed}")]
    InvalidArgument { value: String, allowed: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccessError {
    pub fn not_found(scope: ScopeKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            scope,
            id: id.into(),
        }
    }

    pub fn forbidden(user_id: impl Into<String>, scope: ScopeKind, id: impl Into<String>) -> Self {
        Self::Forbidden {
            user_id: user_id.into(),
            scope,
            id: id.into(),
        }
    }

    /// Create an error for an unrecognized scope kind, naming the allowed values
    pub fn invalid_scope(value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            value: value.into(),
            allowed: ScopeKind::all()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// HTTP status a boundary layer should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            AccessError::NotFound { .. } => 404,
            AccessError::Forbidden { .. } => 403,
            AccessError::InvalidArgument { .. } => 400,
            AccessError::Store(_) => 503,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, AccessError::Forbidden { .. })
    }
}

/// Upstream read failures from a [`crate::directory::Directory`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("directory backend failure: {0}")]
    Backend(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors found while loading a directory seed document
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to parse seed: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error reading seed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate {kind} '{key}'")]
    Duplicate { kind: &'static str, key: String },

    #[error("{kind} '{id}' references unknown {target} '{target_id}'")]
    DanglingReference {
        kind: &'static str,
        id: String,
        target: &'static str,
        target_id: String,
    },

    #[error("Invalid project slug '{slug}': must be lowercase alphanumerics separated by single hyphens")]
    InvalidSlug { slug: String },
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for directory reads
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            AccessError::not_found(ScopeKind::Project, "p1").http_status(),
            404
        );
        assert_eq!(
            AccessError::forbidden("u1", ScopeKind::Task, "t1").http_status(),
            403
        );
        assert_eq!(AccessError::invalid_scope("team").http_status(), 400);
        assert_eq!(
            AccessError::from(StoreError::Unavailable("down".into())).http_status(),
            503
        );
    }

    #[test]
    fn test_invalid_scope_names_allowed_values() {
        let err = AccessError::invalid_scope("team");
        let message = err.to_string();
        assert!(message.contains("'team'"));
        assert!(message.contains("organization, workspace, project, task"));
    }

    #[test]
    fn test_error_display() {
        let err = AccessError::not_found(ScopeKind::Workspace, "ws-9");
        assert_eq!(err.to_string(), "workspace 'ws-9' not found");

        let err = AccessError::forbidden("u3", ScopeKind::Task, "t1");
        assert!(err.to_string().contains("user 'u3'"));
        assert!(err.is_forbidden());
        assert!(!err.is_not_found());
    }
}
