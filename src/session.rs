//! Session state attached to every outgoing request
//!
//! The remote conversation is stateful: login yields a cookie header and a
//! CSRF token scoped to the user, and each exercise's training page yields a
//! bearer token scoped to that exercise. Once a field is set it rides on
//! every subsequent request until explicitly replaced.

use reqwest::RequestBuilder;
use reqwest::header;

/// Derived credentials for the remote site conversation
///
/// Plain mutable holder; it trusts the extraction layer and performs no
/// validation of token formats. Owned exclusively by one
/// [`crate::KataClient`] — sharing a session between concurrent exercise
/// cycles is unsafe because a bearer-token overwrite from one cycle would
/// leak into requests of the other.
#[derive(Clone, Debug)]
pub struct Session {
    base_url: String,
    cookie: Option<String>,
    csrf_token: Option<String>,
    bearer_token: Option<String>,
}

impl Session {
    /// Create an empty session for the given base URL
    ///
    /// A trailing slash on the base URL is stripped so paths can always be
    /// joined with a leading `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            cookie: None,
            csrf_token: None,
            bearer_token: None,
        }
    }

    /// Base URL this session talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a site path (the path must start with `/`)
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Store the request-ready cookie header
    pub fn set_cookies(&mut self, cookie: impl Into<String>) {
        self.cookie = Some(cookie.into());
    }

    /// Store the CSRF token sent as `X-CSRF-Token`
    pub fn set_csrf_token(&mut self, token: impl Into<String>) {
        self.csrf_token = Some(token.into());
    }

    /// Store the bearer token sent as `Authorization`
    ///
    /// Exercise-scoped: each training-page fetch overwrites the prior value.
    pub fn set_bearer_token(&mut self, token: impl Into<String>) {
        self.bearer_token = Some(token.into());
    }

    /// Currently stored cookie header, if any
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Currently stored CSRF token, if any
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Currently stored bearer token, if any
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Attach every stored credential to an outgoing request
    #[must_use]
    pub fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(token) = &self.csrf_token {
            request = request.header("X-CSRF-Token", token);
        }
        if let Some(token) = &self.bearer_token {
            request = request.header(header::AUTHORIZATION, token);
        }
        request
    }
}
