//! # kata-dl
//!
//! Library for practicing coding exercises (katas) hosted on Codewars:
//! sign in as a user, discover a random unsolved exercise in a chosen
//! language, fetch its description and generated starter code, and
//! materialize them as local files with an accompanying test stub.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI; credential prompts and exercise
//!   presentation are the embedding application's job
//! - **Return values over exceptions** - Expected failures (bad login, empty
//!   search, missing metadata) come back as `false`/empty/`None`, never as
//!   errors to catch
//! - **Isolated sessions** - Every client owns its own session state; no
//!   process-wide singleton, so tests and concurrent cycles stay independent
//! - **Event-driven progress** - Consumers subscribe to events, no polling
//!   required
//!
//! The remote site has no scraping contract: tokens hide in form fields,
//! session seeds in doubly-encoded script payloads, project ids in raw
//! markup. Each brittle extraction lives behind a narrow function in
//! [`extract`] with its own failure type.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kata_dl::{Config, Decision, Trainer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut trainer = Trainer::new(Config::default())?;
//!
//!     if !trainer.login("user@example.com", "password").await {
//!         return Err("login failed".into());
//!     }
//!
//!     if let Some(exercise) = trainer.next_exercise("javascript").await? {
//!         println!("{}\n\n{}", exercise.name, exercise.description);
//!         trainer.decide(Decision::Accept).await?;
//!         let materialized = trainer.materialize("./katas".as_ref()).await?;
//!         println!("written to {}", materialized.dir.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP session client for the remote site
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Extraction utilities for semi-structured pages
pub mod extract;
/// Session state attached to outgoing requests
pub mod session;
/// Exercise acquisition and materialization
pub mod trainer;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use client::KataClient;
pub use config::{Config, DirCollisionAction};
pub use error::{Error, ExtractError, Result};
pub use session::Session;
pub use trainer::Trainer;
pub use types::{
    Decision, Event, Exercise, ExportedSource, FlowStage, Materialized, ProjectLink, Rank,
    SessionUser, SolutionPayload,
};
