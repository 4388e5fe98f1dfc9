//! Error types for bx-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for bx-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bx-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials are missing, invalid or expired; the caller must re-authenticate
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A listing or bucket request against the store failed
    #[error("{operation} failed for {target}: {message}")]
    StoreRequest {
        operation: &'static str,
        target: String,
        message: String,
    },

    /// Per-key metadata could not be fetched
    #[error("Metadata unavailable for {0}")]
    MetadataUnavailable(String),

    /// Fetching an object to local storage failed
    #[error("Download of {bucket}/{key} failed: {message}")]
    Download {
        bucket: String,
        key: String,
        message: String,
    },

    /// Requested page lies outside the current view
    #[error("Page {page} is out of range (1..={total})")]
    PageOutOfRange { page: usize, total: usize },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid bucket path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Named profile is not configured
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Shorthand for a failed store request
    pub fn store_request(
        operation: &'static str,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::StoreRequest {
            operation,
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether the caller should force re-authentication
    pub const fn is_credentials(&self) -> bool {
        matches!(self, Error::InvalidCredentials(_))
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::Config(_) | Error::PageOutOfRange { .. } => 2, // UsageError
            Error::StoreRequest { .. } | Error::Download { .. } => 3, // NetworkError
            Error::InvalidCredentials(_) => 4,                        // AuthError
            Error::NotFound(_) | Error::ProfileNotFound(_) => 5,      // NotFound
            _ => 1,                                                   // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::InvalidPath("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::PageOutOfRange { page: 3, total: 2 }.exit_code(), 2);
        assert_eq!(Error::store_request("list", "b", "boom").exit_code(), 3);
        assert_eq!(Error::InvalidCredentials("expired".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::ProfileNotFound("dev".into()).exit_code(), 5);
        assert_eq!(Error::MetadataUnavailable("k".into()).exit_code(), 1);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::store_request("ListObjectsV2", "photos/2024/", "timeout");
        assert_eq!(
            err.to_string(),
            "ListObjectsV2 failed for photos/2024/: timeout"
        );

        let err = Error::Download {
            bucket: "photos".into(),
            key: "a.jpg".into(),
            message: "reset".into(),
        };
        assert_eq!(err.to_string(), "Download of photos/a.jpg failed: reset");
    }

    #[test]
    fn test_is_credentials() {
        assert!(Error::InvalidCredentials("x".into()).is_credentials());
        assert!(!Error::General("x".into()).is_credentials());
    }
}
