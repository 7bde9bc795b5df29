//! Configuration types for kata-dl

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the trainer and its HTTP client
///
/// All fields have sensible defaults targeting the public Codewars site, so
/// `Config::default()` works out of the box. The base URL is overridable to
/// point at a mock server in tests — there is no process-wide client state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote site (default: "https://www.codewars.com")
    ///
    /// A trailing slash is tolerated and stripped when the client is built.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    ///
    /// Bounds worst-case latency against an unreliable remote site; every
    /// network call in the client is subject to it.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// User-Agent header sent on every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// What to do when the exercise's target directory already exists
    #[serde(default)]
    pub dir_collision: DirCollisionAction,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            dir_collision: DirCollisionAction::default(),
        }
    }
}

/// Directory collision handling for materialized exercises
///
/// A repeated exercise produces the same slug-named directory. The policy for
/// that case is an explicit choice rather than silent behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirCollisionAction {
    /// Reuse the existing directory, overwriting artifact files in place
    #[default]
    Reuse,

    /// Refuse to write and fail the materialization attempt
    Fail,

    /// Probe "name (1)", "name (2)", ... until an unused directory is found
    Rename,
}

fn default_base_url() -> String {
    "https://www.codewars.com".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("kata-dl/", env!("CARGO_PKG_VERSION")).to_string()
}
