use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Callers (and the RPC layer that
// wraps this crate) match on these — never on the message string.

/// Stable error code constants.
///
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const CORRUPTION: &str = "CORRUPTION";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── RepositoryError ─────────────────────────────────────────────────

/// Unified error type for catalog, packager and index store operations.
///
/// Each variant maps to a stable error code (see [`error_code`]).
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A brand, model, version, profile, codec or catalog file does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input is invalid: missing working directory, bad field-mask path.
    #[error("{0}")]
    InvalidArgument(String),

    /// The catalog or a packaged index is damaged: malformed YAML, a stored
    /// index document that cannot be decoded, an unreadable archive.
    #[error("{0}")]
    Corruption(String),

    /// An index open exceeded its deadline.
    #[error("{0}")]
    Timeout(String),

    /// Filesystem, network or search backend failure.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl RepositoryError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            RepositoryError::NotFound(_) => error_code::NOT_FOUND,
            RepositoryError::InvalidArgument(_) => error_code::INVALID_ARGUMENT,
            RepositoryError::Corruption(_) => error_code::CORRUPTION,
            RepositoryError::Timeout(_) => error_code::TIMEOUT,
            RepositoryError::Storage(_) => error_code::STORAGE_ERROR,
            RepositoryError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// Whether this error is a NotFound condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}
