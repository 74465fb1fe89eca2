//! Unified application error types for Stowage.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The entity is absent or not owned by the caller.
    NotFound,
    /// A sibling with the same name already exists.
    DuplicateName,
    /// The root folder cannot be renamed or deleted.
    ProtectedEntity,
    /// A cross-owner access was detected mid-operation.
    Authorization,
    /// The stored hierarchy is corrupted (missing root, parent cycle).
    Integrity,
    /// Blob I/O failed.
    Io,
    /// Metadata store I/O failed.
    Store,
    /// A conflicting state exists (root already created, concurrent child).
    Conflict,
    /// A single file of an upload batch could not be committed.
    Upload,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind represents a server-side fault rather than a
    /// caller mistake.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Integrity | Self::Io | Self::Store | Self::Configuration | Self::Internal
        )
    }

    /// Stable machine-readable code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::DuplicateName => "DUPLICATE_NAME",
            Self::ProtectedEntity => "PROTECTED_ENTITY",
            Self::Authorization => "AUTHORIZATION",
            Self::Integrity => "INTEGRITY",
            Self::Io => "IO",
            Self::Store => "STORE",
            Self::Conflict => "CONFLICT",
            Self::Upload => "UPLOAD",
            Self::Validation => "VALIDATION",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout Stowage.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a duplicate-name error.
    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName, message)
    }

    /// Create a protected-entity error.
    pub fn protected_entity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProtectedEntity, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create an integrity error.
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Integrity, message)
    }

    /// Create a blob I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    /// Create a metadata store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an upload error.
    pub fn upload(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upload, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` if this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::duplicate_name("folder 'Reports' already exists");
        assert_eq!(
            err.to_string(),
            "DUPLICATE_NAME: folder 'Reports' already exists"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io_err.into();
        assert!(err.is(ErrorKind::Io));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_clone_drops_source() {
        let err = AppError::with_source(
            ErrorKind::Store,
            "insert failed",
            std::io::Error::other("boom"),
        );
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Store);
        assert!(cloned.source.is_none());
    }

    #[test]
    fn test_server_fault_classification() {
        assert!(ErrorKind::Integrity.is_server_fault());
        assert!(ErrorKind::Store.is_server_fault());
        assert!(!ErrorKind::NotFound.is_server_fault());
        assert!(!ErrorKind::DuplicateName.is_server_fault());
        assert!(!ErrorKind::Upload.is_server_fault());
    }
}
