//! Core types and events
//!
//! Each remote endpoint gets its own result type with optional fields where
//! the remote contract genuinely allows partial success. Payloads are
//! validated at the serde boundary; a shape mismatch fails the whole fetch
//! rather than propagating a malformed structure.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One coding exercise (kata) as returned by the metadata endpoint
///
/// Immutable once fetched. Only the fields this library consumes are modeled;
/// unknown fields in the remote payload are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    /// Opaque exercise identifier
    pub id: String,

    /// Human-readable exercise name (slugified for the target directory)
    pub name: String,

    /// Canonical URL of the exercise on the remote site
    #[serde(default)]
    pub url: String,

    /// Exercise description, markdown text
    #[serde(default)]
    pub description: String,

    /// Difficulty rank, when the remote payload carries one
    #[serde(default)]
    pub rank: Option<Rank>,
}

/// Difficulty rank of an exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rank {
    /// Rank display name (e.g., "6 kyu")
    #[serde(default)]
    pub name: Option<String>,
}

/// Client-side session seed embedded in the training page
///
/// The page inlines a `JSON.parse("...")` call whose decoded object carries
/// the exercise-scoped bearer token in its `jwt` field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Exercise-scoped bearer token for the solution endpoint
    #[serde(default)]
    pub jwt: Option<String>,
}

/// Result of scraping the training page for an exercise
///
/// Both extractions run independently, so either field can be present on its
/// own. A network failure leaves both absent.
#[derive(Clone, Debug, Default)]
pub struct ProjectLink {
    /// Remote project id (hex), location of the solution endpoint
    pub project_id: Option<String>,

    /// Embedded session user carrying the bearer token
    pub session_user: Option<SessionUser>,
}

/// Generated starter/test code for one project session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolutionPayload {
    /// Starter code, expected to contain one top-level function definition
    #[serde(default)]
    pub setup: String,

    /// Example test fixture shipped with the exercise
    #[serde(default, rename = "exampleFixture")]
    pub example_fixture: String,
}

/// Starter code with an appended export of its primary function
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedSource {
    /// The starter code plus the appended export statement
    pub source: String,

    /// Name of the exported function
    pub function_name: String,
}

/// Caller's verdict on a presented exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Try this exercise: proceed to materialization
    Accept,

    /// Skip it: discard and present another one
    Reject,
}

/// Stage of the exercise-acquisition flow
///
/// Transitions are driven by collaborator decisions and network outcomes,
/// which makes retry-on-reject and abort-on-fatal-error observable without a
/// UI attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowStage {
    /// No exercise in flight
    Idle,

    /// Refilling the candidate pool via search
    Searching,

    /// An exercise is presented, awaiting a decision
    Presenting,

    /// The presented exercise was accepted
    Accepted,

    /// The presented exercise was rejected; a new cycle is starting
    Rejected,

    /// Fetching project link and solution payload, writing artifacts
    Materializing,

    /// Artifacts written
    Done,

    /// The current attempt failed; the session itself remains usable
    Failed,
}

/// Progress events emitted by the trainer
///
/// Consumers subscribe via [`crate::Trainer::subscribe`]; sends are lossy and
/// never block the pipeline.
#[derive(Clone, Debug)]
pub enum Event {
    /// Login completed successfully; session credentials stored
    LoginSucceeded,

    /// Login failed (wrong credentials, missing token, network error)
    LoginFailed,

    /// A candidate search has started
    SearchStarted {
        /// Language the search is filtered to
        language: String,
    },

    /// A candidate search finished
    CandidatesFound {
        /// Number of candidate ids found (possibly zero)
        count: usize,
    },

    /// An exercise is being presented for a decision
    Presenting {
        /// Exercise id
        id: String,
        /// Exercise name
        name: String,
    },

    /// The presented exercise was rejected
    Skipped {
        /// Exercise id that was skipped
        id: String,
    },

    /// Materialization of an accepted exercise has started
    MaterializeStarted {
        /// Exercise id being materialized
        id: String,
    },

    /// Artifacts were written to disk
    ArtifactsWritten {
        /// Directory the artifacts were written into
        dir: PathBuf,
    },

    /// The test stub could not be written (other artifacts are kept)
    TestWriteFailed {
        /// The underlying write error
        error: String,
    },
}

/// Outcome of a successful materialization
///
/// `warnings` records best-effort degradations (missing test stub, no
/// exportable function) that did not abort the attempt.
#[derive(Clone, Debug)]
pub struct Materialized {
    /// Directory the artifacts were written into
    pub dir: PathBuf,

    /// Path of the written description file
    pub description_path: PathBuf,

    /// Path of the written solution file
    pub solution_path: PathBuf,

    /// Path of the written test stub, when one was written
    pub test_path: Option<PathBuf>,

    /// Human-readable warnings for partial outcomes
    pub warnings: Vec<String>,
}
