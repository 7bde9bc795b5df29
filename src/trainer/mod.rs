//! Exercise acquisition and materialization
//!
//! Orchestrates one full exercise cycle: refill the candidate pool via
//! search, pop one id, fetch its metadata, present it for an accept/reject
//! decision, then fetch the project link and solution payload and write the
//! artifacts. The flow is an explicit state machine ([`FlowStage`]) driven by
//! collaborator decisions and network outcomes, so retry-on-reject and
//! abort-on-fatal-error are testable without any UI attached.


use crate::client::KataClient;
use crate::config::{Config, DirCollisionAction};
use crate::error::{Error, Result};
use crate::extract;
use crate::types::{Decision, Event, Exercise, FlowStage, Materialized, SolutionPayload};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Maximum number of probes when resolving directory collisions by renaming
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Capacity of the progress event channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// The exercise currently in flight, with the language it was requested for
#[derive(Clone, Debug)]
struct Presented {
    exercise: Exercise,
    language: String,
}

/// Drives exercise acquisition against one [`KataClient`]
///
/// Owns the client (and thereby the session state), the candidate id pool,
/// and the flow stage. One trainer runs one sequential flow; to run cycles
/// concurrently, create one trainer per cycle — sharing a session between
/// concurrent cycles would let one cycle's bearer-token overwrite leak into
/// the other's requests.
#[derive(Debug)]
pub struct Trainer {
    client: KataClient,
    config: Config,
    pool: Vec<String>,
    current: Option<Presented>,
    stage: FlowStage,
    event_tx: broadcast::Sender<Event>,
}

impl Trainer {
    /// Create a trainer with a fresh client from configuration
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = KataClient::new(&config)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            client,
            config,
            pool: Vec::new(),
            current: None,
            stage: FlowStage::Idle,
            event_tx,
        })
    }

    /// Subscribe to progress events
    ///
    /// Long-running waits (login, search, fetch, writes) report through this
    /// channel so a presentation layer can show indeterminate progress
    /// without polling.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current stage of the acquisition flow
    #[must_use]
    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    /// Read-only access to the underlying client
    #[must_use]
    pub fn client(&self) -> &KataClient {
        &self.client
    }

    /// Number of candidate ids remaining in the pool
    #[must_use]
    pub fn candidates_remaining(&self) -> usize {
        self.pool.len()
    }

    /// Sign in with the given credentials
    ///
    /// Returns `false` on failure; see [`KataClient::login`].
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        let signed_in = self.client.login(email, password).await;
        self.emit(if signed_in {
            Event::LoginSucceeded
        } else {
            Event::LoginFailed
        });
        signed_in
    }

    /// Fetch the next candidate exercise for presentation
    ///
    /// Refills the candidate pool via search when it is empty, pops one id
    /// (most recently fetched batch drains last-in-first-out), and fetches
    /// its metadata.
    ///
    /// Returns `Ok(None)` when the pool is still empty after a refill —
    /// nothing to show, not a failure.
    ///
    /// # Errors
    /// Returns [`Error::MetadataUnavailable`] when the metadata fetch fails;
    /// the pool keeps its remaining ids so the caller can retry without a
    /// fresh search.
    pub async fn next_exercise(&mut self, language: &str) -> Result<Option<Exercise>> {
        self.current = None;

        if self.pool.is_empty() {
            self.stage = FlowStage::Searching;
            self.emit(Event::SearchStarted {
                language: language.to_string(),
            });
            self.pool = self.client.search_candidate_ids(language).await;
            self.emit(Event::CandidatesFound {
                count: self.pool.len(),
            });
        }

        let Some(id) = self.pool.pop() else {
            info!(language, "no candidate exercises found");
            self.stage = FlowStage::Idle;
            return Ok(None);
        };

        let Some(exercise) = self.client.fetch_metadata(&id).await else {
            self.stage = FlowStage::Failed;
            return Err(Error::MetadataUnavailable { id });
        };

        self.emit(Event::Presenting {
            id: exercise.id.clone(),
            name: exercise.name.clone(),
        });
        self.stage = FlowStage::Presenting;
        self.current = Some(Presented {
            exercise: exercise.clone(),
            language: language.to_string(),
        });
        Ok(Some(exercise))
    }

    /// Apply the collaborator's decision on the presented exercise
    ///
    /// `Accept` keeps the current exercise and moves the flow to
    /// [`FlowStage::Accepted`], returning it for confirmation. `Reject`
    /// discards it and restarts the cycle with the same language, returning
    /// the next presentation (or `None` when the pool ran dry).
    ///
    /// # Errors
    /// Returns [`Error::InvalidFlowState`] when no exercise is being
    /// presented, or any error from the restarted cycle on rejection.
    pub async fn decide(&mut self, decision: Decision) -> Result<Option<Exercise>> {
        if self.stage != FlowStage::Presenting {
            return Err(self.invalid_state("decide"));
        }
        let Some(presented) = self.current.clone() else {
            return Err(self.invalid_state("decide"));
        };

        match decision {
            Decision::Accept => {
                self.stage = FlowStage::Accepted;
                Ok(Some(presented.exercise))
            }
            Decision::Reject => {
                self.emit(Event::Skipped {
                    id: presented.exercise.id,
                });
                self.stage = FlowStage::Rejected;
                self.next_exercise(&presented.language).await
            }
        }
    }

    /// Materialize the accepted exercise into the workspace
    ///
    /// Fetches the project link, installs the extracted bearer token
    /// (overwriting any prior value), fetches the solution payload, and
    /// writes description, solution, and test artifacts into a slug-named
    /// directory under `workspace`. A test-stub write failure does not roll
    /// back the other artifacts; it is surfaced as a warning on the result.
    ///
    /// # Errors
    /// - [`Error::InvalidFlowState`] when no exercise has been accepted
    /// - [`Error::ProjectUnavailable`] when no project id could be extracted
    /// - [`Error::SolutionUnavailable`] when the solution fetch fails
    /// - [`Error::DirectoryCollision`] / [`Error::Io`] on filesystem failures
    ///
    /// Any of these fails the current attempt only; the trainer remains
    /// usable for another cycle.
    pub async fn materialize(&mut self, workspace: &Path) -> Result<Materialized> {
        if self.stage != FlowStage::Accepted {
            return Err(self.invalid_state("materialize"));
        }
        let Some(Presented { exercise, language }) = self.current.take() else {
            return Err(self.invalid_state("materialize"));
        };

        self.stage = FlowStage::Materializing;
        self.emit(Event::MaterializeStarted {
            id: exercise.id.clone(),
        });

        let link = self.client.fetch_project_link(&exercise.id, &language).await;
        let Some(project_id) = link.project_id else {
            self.stage = FlowStage::Failed;
            return Err(Error::ProjectUnavailable { id: exercise.id });
        };
        if let Some(user) = &link.session_user
            && let Some(jwt) = &user.jwt
        {
            self.client.set_bearer_token(jwt.clone());
        }

        let Some(payload) = self
            .client
            .fetch_solution_payload(&project_id, &language)
            .await
        else {
            self.stage = FlowStage::Failed;
            return Err(Error::SolutionUnavailable { project_id });
        };

        let result = self.write_artifacts(&exercise, &language, &payload, workspace);
        self.stage = match &result {
            Ok(_) => FlowStage::Done,
            Err(_) => FlowStage::Failed,
        };
        result
    }

    /// Write description, solution, and test artifacts for one exercise
    fn write_artifacts(
        &mut self,
        exercise: &Exercise,
        language: &str,
        payload: &SolutionPayload,
        workspace: &Path,
    ) -> Result<Materialized> {
        let slug = extract::slugify(&exercise.name);
        // Degenerate empty slug: fall back to the opaque exercise id
        let dir_name = if slug.is_empty() {
            exercise.id.clone()
        } else {
            slug
        };
        let dir = resolve_directory(workspace.join(dir_name), self.config.dir_collision)?;
        fs::create_dir_all(&dir)?;

        let description_path = dir.join("description.md");
        fs::write(&description_path, &exercise.description)?;

        let mut warnings = Vec::new();
        let (solution_body, function_name) = match extract::append_export(&payload.setup) {
            Ok(exported) => (exported.source, Some(exported.function_name)),
            Err(e) => {
                warn!(id = %exercise.id, error = %e, "starter code has no exportable function");
                warnings.push(format!(
                    "starter code has no function declaration; test stub skipped ({e})"
                ));
                (payload.setup.clone(), None)
            }
        };

        let extension = extract::file_extension(language);
        let provenance = format!(
            "// URL: {}/kata/{}/train/{}\n\n",
            self.client.session().base_url(),
            exercise.id,
            language
        );
        let solution_path = dir.join(format!("solution.{extension}"));
        fs::write(&solution_path, format!("{provenance}{solution_body}"))?;

        let test_path = function_name.and_then(|name| {
            let content = format!(
                "const {{ describe, it }} = require(\"@jest/globals\");\n\n\
                 const {{ {name} }} = require(\"./solution.{extension}\");\n\n{fixture}",
                fixture = payload.example_fixture
            );
            let path = dir.join(format!("solution.test.{extension}"));
            match fs::write(&path, content) {
                Ok(()) => Some(path),
                Err(e) => {
                    // Best-effort: keep the artifacts already on disk
                    warn!(path = %path.display(), error = %e, "failed to write test stub");
                    self.emit(Event::TestWriteFailed {
                        error: e.to_string(),
                    });
                    warnings.push(format!("failed to write test stub: {e}"));
                    None
                }
            }
        });

        info!(id = %exercise.id, dir = %dir.display(), "exercise materialized");
        self.emit(Event::ArtifactsWritten { dir: dir.clone() });

        Ok(Materialized {
            dir,
            description_path,
            solution_path,
            test_path,
            warnings,
        })
    }

    fn invalid_state(&self, operation: &str) -> Error {
        Error::InvalidFlowState {
            operation: operation.to_string(),
            stage: format!("{:?}", self.stage),
        }
    }

    fn emit(&self, event: Event) {
        // Lossy by design: progress reporting must never block the pipeline
        self.event_tx.send(event).ok();
    }
}

/// Apply the configured collision policy to a target directory
fn resolve_directory(path: PathBuf, action: DirCollisionAction) -> Result<PathBuf> {
    match action {
        DirCollisionAction::Reuse => Ok(path),
        DirCollisionAction::Fail => {
            if path.exists() {
                return Err(Error::DirectoryCollision { path });
            }
            Ok(path)
        }
        DirCollisionAction::Rename => {
            if !path.exists() {
                return Ok(path);
            }
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parent = path.parent().unwrap_or_else(|| Path::new("."));

            for i in 1..=MAX_RENAME_ATTEMPTS {
                let candidate = parent.join(format!("{name} ({i})"));
                if !candidate.exists() {
                    return Ok(candidate);
                }
            }
            Err(Error::DirectoryCollision { path })
        }
    }
}
