//! Error types for the Reelsync client.

use thiserror::Error;

/// The closed set of failures surfaced by the session and sync layer.
///
/// Callers branch on the variant, never on the rendered message. The
/// credential-rejection variants invalidate the local session; the transient
/// ones never do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReelsyncError {
    /// The credential service rejected the identifier/secret pair.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup for an identifier that is already registered.
    #[error("Identity already exists")]
    IdentityExists,

    /// The stored credential is no longer accepted.
    #[error("Credential expired")]
    Expired,

    /// The credential is valid but lacks the scope required by the call.
    #[error("Insufficient scope")]
    InsufficientScope,

    /// The remote service answered with a rejection that has no dedicated kind.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The credential service could not be reached.
    #[error("Service unreachable: {0}")]
    Unreachable(String),

    /// The document store failed or could not be reached.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// An operation that needs a session was attempted while anonymous.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The movie catalog failed or could not be reached.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Durable local storage (session token) failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReelsyncError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Returns true for rejections that mean the stored credential is unusable.
    ///
    /// These clear the local session immediately.
    pub fn is_session_invalidating(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::Expired | Self::InsufficientScope
        )
    }

    /// Returns true when a call made with the stored credential was refused
    /// because of that credential.
    ///
    /// Narrower than [`Self::is_session_invalidating`]: a failed password
    /// exchange is not a verdict on the stored credential.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(self, Self::Expired | Self::InsufficientScope)
    }

    /// Returns true for failures that say nothing about the credential and may
    /// succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::StoreUnavailable(_) | Self::Catalog(_)
        )
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ReelsyncError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for ReelsyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ReelsyncError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ReelsyncError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ReelsyncError>`.
pub type Result<T> = std::result::Result<T, ReelsyncError>;
