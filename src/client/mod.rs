//! HTTP session client for the remote challenge site
//!
//! Encapsulates every network interaction and the session state it depends
//! on. The site was not designed to be scraped: the conversation mixes form
//! posts, HTML scraping, and JSON endpoints, and later requests depend on
//! side effects of earlier ones (login seeds the cookie/CSRF pair, the
//! training page seeds the exercise-scoped bearer token).
//!
//! Expected failure modes never escape as errors from the public operations:
//! login returns `false`, search returns an empty vector, fetches return
//! `None`/empty — callers program against return values, not error matching.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract;
use crate::session::Session;
use crate::types::{Exercise, ProjectLink, SolutionPayload};
use reqwest::header;
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// CSS selector for kata entries in the search result list
const SEARCH_RESULT_SELECTOR: &str = ".list-item-kata[id]";

/// Authenticated client for the remote challenge site
///
/// Owns the [`Session`] and a single `reqwest::Client`. Construct one per
/// logical session; there is no process-wide instance. Cookies are managed
/// manually through the session (no cookie store) because the site workflow
/// needs the reduced cookie header inspected for embedded tokens.
#[derive(Clone, Debug)]
pub struct KataClient {
    http: reqwest::Client,
    session: Session,
}

impl KataClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the underlying HTTP client cannot be
    /// built from the configured timeout/user agent.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
                key: Some("request_timeout".to_string()),
            })?;

        Ok(Self {
            http,
            session: Session::new(config.base_url.clone()),
        })
    }

    /// Read-only view of the session state
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Store a request-ready cookie header for all future requests
    pub fn set_cookies(&mut self, cookie: impl Into<String>) {
        self.session.set_cookies(cookie);
    }

    /// Store a CSRF token for all future requests
    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.session.set_csrf_token(token);
    }

    /// Store an exercise-scoped bearer token for all future requests
    ///
    /// Overwrites any prior value; must be called with the token extracted by
    /// [`fetch_project_link`](Self::fetch_project_link) before
    /// [`fetch_solution_payload`](Self::fetch_solution_payload) for the same
    /// exercise.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.session.set_bearer_token(token);
    }

    /// Sign in and persist the resulting cookie/CSRF/authorization values
    ///
    /// Fetches the sign-in page, extracts the authenticity token (the whole
    /// operation fails without it), posts the credential form, and reduces
    /// the `Set-Cookie` response headers into the session. Login failure is
    /// expected and recoverable, so any failure yields `false`, logged but
    /// never thrown.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        match self.try_login(email, password).await {
            Ok(signed_in) => signed_in,
            Err(e) => {
                warn!(error = %e, "login failed");
                false
            }
        }
    }

    async fn try_login(&mut self, email: &str, password: &str) -> Result<bool> {
        let url = self.session.url("/users/sign_in");

        let page = self
            .session
            .apply(self.http.get(&url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let token = extract::authenticity_token(&page)?;

        let form = [
            ("utf8", "✓"),
            ("authenticity_token", token.as_str()),
            ("user[email]", email),
            ("user[password]", password),
            ("commit", "Sign in"),
        ];
        let response = self
            .session
            .apply(self.http.post(&url))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "sign-in rejected");
            return Ok(false);
        }

        let cookie_header = extract::reduce_set_cookie(
            response
                .headers()
                .get_all(header::SET_COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        );
        let cookies = extract::parse_cookie_pairs(&cookie_header);

        self.session.set_cookies(cookie_header);
        if let Some(csrf) = cookies.get("csrf-token") {
            self.session.set_csrf_token(csrf.clone());
        }
        if let Some(authorization) = cookies.get("authorization") {
            self.session.set_bearer_token(authorization.clone());
        }

        debug!("login succeeded, session credentials stored");
        Ok(true)
    }

    /// Search for candidate exercise ids in the given language
    ///
    /// Queries the search endpoint filtered to completed exercises, sampled
    /// server-side, most recent first, and collects the id attribute of each
    /// result item in document order. Any network or parse failure is treated
    /// as "no candidates found": logged, empty vector returned.
    pub async fn search_candidate_ids(&self, language: &str) -> Vec<String> {
        match self.try_search(language).await {
            Ok(ids) => {
                debug!(language, count = ids.len(), "candidate search finished");
                ids
            }
            Err(e) => {
                warn!(language, error = %e, "candidate search failed");
                Vec::new()
            }
        }
    }

    async fn try_search(&self, language: &str) -> Result<Vec<String>> {
        let url = self.session.url(&format!("/kata/search/{language}"));
        let html = self
            .session
            .apply(self.http.get(&url))
            .query(&[
                ("xids", "completed"),
                ("beta", "false"),
                ("order_by", "sort_date desc"),
                ("sample", "true"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(scrape_candidate_ids(&html))
    }

    /// Fetch exercise metadata by id
    ///
    /// Returns `None` on any failure (network, HTTP status, payload shape).
    pub async fn fetch_metadata(&self, id: &str) -> Option<Exercise> {
        match self.try_fetch_metadata(id).await {
            Ok(exercise) => Some(exercise),
            Err(e) => {
                warn!(id, error = %e, "metadata fetch failed");
                None
            }
        }
    }

    async fn try_fetch_metadata(&self, id: &str) -> Result<Exercise> {
        let url = self.session.url(&format!("/api/v1/code-challenges/{id}"));
        let exercise = self
            .session
            .apply(self.http.get(&url))
            .send()
            .await?
            .error_for_status()?
            .json::<Exercise>()
            .await?;
        Ok(exercise)
    }

    /// Fetch the training page and extract project id and session user
    ///
    /// The two extractions run independently: partial success is a valid
    /// outcome and both fields are optional. A failed page fetch leaves both
    /// absent.
    pub async fn fetch_project_link(&self, id: &str, language: &str) -> ProjectLink {
        let url = self.session.url(&format!("/kata/{id}/train/{language}"));
        let html = match self.try_fetch_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(id, language, error = %e, "training page fetch failed");
                return ProjectLink::default();
            }
        };

        let project_id = match extract::project_id(&html) {
            Ok(project_id) => Some(project_id),
            Err(e) => {
                debug!(id, error = %e, "training page had no project id");
                None
            }
        };
        let session_user = match extract::embedded_session_user(&html) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(id, error = %e, "training page had no session user");
                None
            }
        };

        ProjectLink {
            project_id,
            session_user,
        }
    }

    async fn try_fetch_page(&self, url: &str) -> Result<String> {
        let html = self
            .session
            .apply(self.http.get(url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(html)
    }

    /// Create a remote session for the project and fetch its solution payload
    ///
    /// Requires the exercise-scoped bearer token to be installed first. The
    /// remote call is not idempotent (it may create remote state each time),
    /// so it is issued exactly once per attempt — no automatic retry.
    /// Returns `None` on any failure.
    pub async fn fetch_solution_payload(
        &self,
        project_id: &str,
        language: &str,
    ) -> Option<SolutionPayload> {
        match self.try_fetch_solution(project_id, language).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(project_id, language, error = %e, "solution payload fetch failed");
                None
            }
        }
    }

    async fn try_fetch_solution(&self, project_id: &str, language: &str) -> Result<SolutionPayload> {
        let url = self
            .session
            .url(&format!("/kata/projects/{project_id}/{language}/session"));
        let payload = self
            .session
            .apply(self.http.post(&url))
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .header("x-requested-with", "XMLHttpRequest")
            .json(&serde_json::json!({}))
            .send()
            .await?
            .error_for_status()?
            .json::<SolutionPayload>()
            .await?;
        Ok(payload)
    }
}

/// Collect the id attribute of each search result item, in document order
fn scrape_candidate_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(SEARCH_RESULT_SELECTOR) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("id"))
        .map(str::to_string)
        .collect()
}
