//! Error types for kata-dl
//!
//! Failure handling follows a small taxonomy:
//! - Recoverable-empty outcomes (login failed, search found nothing, metadata
//!   missing) are returned as `false` / empty / `None` by the client and never
//!   surface here.
//! - Extraction failures are [`ExtractError`] values so callers can decide
//!   whether a missing token is fatal for the current step.
//! - Fatal-for-attempt conditions (no project id, no solution payload) abort
//!   one exercise's materialization via [`Error`] without ending the session.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kata-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kata-dl
///
/// This is the primary error type used throughout the library. Each variant
/// includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be extracted from a remote page
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Exercise metadata could not be fetched
    ///
    /// The candidate pool keeps its remaining ids, so the caller can retry
    /// with another exercise without issuing a fresh search.
    #[error("metadata unavailable for exercise {id}")]
    MetadataUnavailable {
        /// The exercise id whose metadata fetch failed
        id: String,
    },

    /// The training page yielded no project id
    ///
    /// Without a project id the solution endpoint cannot be located, so the
    /// current exercise's materialization cannot continue.
    #[error("no project id obtained for exercise {id}")]
    ProjectUnavailable {
        /// The exercise id whose training page had no project id
        id: String,
    },

    /// The solution payload could not be fetched
    #[error("solution payload unavailable for project {project_id}")]
    SolutionUnavailable {
        /// The remote project id whose session-creation call failed
        project_id: String,
    },

    /// Operation attempted in a flow stage that does not allow it
    #[error("cannot {operation} in stage {stage}")]
    InvalidFlowState {
        /// The operation that was attempted (e.g., "decide", "materialize")
        operation: String,
        /// The current flow stage that prevents the operation
        stage: String,
    },

    /// Target directory already exists and the collision policy forbids reuse
    #[error("directory already exists: {}", path.display())]
    DirectoryCollision {
        /// The directory that already exists on disk
        path: PathBuf,
    },
}

/// Extraction failures: a token or value was not found in semi-structured input
///
/// Every variant means "not found", never "malformed input crashed the
/// parser" — malformed markup or JSON fails closed into the matching variant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No `authenticity_token` hidden field in the sign-in page
    #[error("no authenticity token in page")]
    AuthenticityTokenNotFound,

    /// No parseable `JSON.parse(...)` session payload in the training page
    #[error("no embedded session user in page")]
    SessionUserNotFound,

    /// No `/kata/projects/<id>/` path segment in the training page
    #[error("no project id in page")]
    ProjectIdNotFound,

    /// No top-level function declaration in the starter code
    #[error("no function declaration in starter code")]
    FunctionNotFound,
}
