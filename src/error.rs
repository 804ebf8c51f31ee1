//! Error types for vaultwire operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`VaultwireError`].
pub type Result<T> = std::result::Result<T, VaultwireError>;

/// Errors that can occur while reading credentials or driving a provider.
///
/// All errors implement `std::error::Error` and can be chained with `source()`.
#[derive(Debug, Error)]
pub enum VaultwireError {
    /// Auth file is missing or could not be read.
    #[error("auth file not found or unreadable: {}", path.display())]
    FileNotFound {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Auth file looked like JSON but did not parse as a JSON object.
    #[error("malformed auth file: {0}")]
    Parse(#[source] serde_json::Error),

    /// A credential field required by the caller is empty.
    #[error("missing credential field: {0}")]
    MissingCredential(String),

    /// Resource was not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Resource already exists (cannot create duplicate).
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    /// Provider has not been authenticated.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Resource name violates the naming rules for its kind.
    #[error("invalid resource name: {0}")]
    InvalidResourceName(String),

    /// Operation is not supported by this provider.
    #[error("operation not supported by provider: {0}")]
    NotSupported(String),

    /// Provider operation failed with context.
    #[error("{provider}: {operation} {resource}: {source}")]
    ProviderOperation {
        /// Provider name
        provider: String,
        /// Operation name (create, deploy, delete, etc.)
        operation: String,
        /// Resource name
        resource: String,
        /// Underlying error
        #[source]
        source: Box<VaultwireError>,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error (catch-all).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VaultwireError {
    /// Creates a provider operation error with context.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultwire::VaultwireError;
    ///
    /// let err = VaultwireError::NotFound("rg-demo".to_string());
    /// let wrapped = VaultwireError::provider_op("memory", "delete", "rg-demo", err);
    ///
    /// assert_eq!(
    ///     wrapped.to_string(),
    ///     "memory: delete rg-demo: resource not found: rg-demo"
    /// );
    /// ```
    pub fn provider_op(
        provider: impl Into<String>,
        operation: impl Into<String>,
        resource: impl Into<String>,
        err: VaultwireError,
    ) -> Self {
        Self::ProviderOperation {
            provider: provider.into(),
            operation: operation.into(),
            resource: resource.into(),
            source: Box::new(err),
        }
    }

    /// Returns true for a missing or unreadable auth file.
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Returns true for a malformed JSON auth file.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns true when this error, or the error it wraps, is `NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::ProviderOperation { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = VaultwireError::NotFound("rg-demo".to_string());
        assert_eq!(err.to_string(), "resource not found: rg-demo");
    }

    #[test]
    fn test_file_not_found_display() {
        let err = VaultwireError::FileNotFound {
            path: PathBuf::from("/nope/auth.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/nope/auth.json"));
        assert!(err.is_file_not_found());
        assert!(!err.is_parse());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_provider_operation_error() {
        let inner = VaultwireError::AlreadyExists("kv-demo".to_string());
        let err = VaultwireError::provider_op("memory", "create", "kv-demo", inner);

        let error_string = err.to_string();
        assert!(error_string.contains("memory"));
        assert!(error_string.contains("create"));
        assert!(error_string.contains("kv-demo"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_not_found_through_wrapper() {
        let inner = VaultwireError::NotFound("rg".to_string());
        let err = VaultwireError::provider_op("memory", "delete", "rg", inner);
        assert!(err.is_not_found());
        assert!(!VaultwireError::NotAuthenticated.is_not_found());
    }
}
