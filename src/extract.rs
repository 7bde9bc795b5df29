//! Extraction utilities for semi-structured remote pages
//!
//! The remote site has no stable scraping contract: tokens live in hidden
//! form fields, the session seed is a doubly-encoded JSON blob inside a
//! script block, and the project id is a path segment in raw markup. Each
//! extraction is a narrow pure function that fails closed with an
//! [`ExtractError`] — malformed input is "not found", never a panic.

use crate::error::ExtractError;
use crate::types::{ExportedSource, SessionUser};
use regex::Regex;
use std::collections::HashMap;

/// Marker preceding the embedded session payload in the training page
const SESSION_PARSE_CALL: &str = "JSON.parse(";

/// Extract the sign-in form's hidden `authenticity_token` value
///
/// # Errors
/// Returns [`ExtractError::AuthenticityTokenNotFound`] if the field is absent.
pub fn authenticity_token(html: &str) -> Result<String, ExtractError> {
    // Patterns here are literals; a compile failure is indistinguishable
    // from the token being absent.
    let re = Regex::new(r#"name="authenticity_token" value="([^"]+)""#)
        .map_err(|_| ExtractError::AuthenticityTokenNotFound)?;
    re.captures(html)
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str().to_string())
        .ok_or(ExtractError::AuthenticityTokenNotFound)
}

/// Extract the session user embedded in a training page
///
/// The page seeds client-side state with a call of the form
/// `JSON.parse("<escaped JSON>")`. The argument is doubly encoded: a JSON
/// string literal whose contents, once parsed, are themselves a JSON-encoded
/// object. Decoding therefore runs in two stages:
///
/// 1. The string literal after the first `JSON.parse(` is parsed with a
///    stream deserializer, so the literal's own escaping delimits it — no
///    balancing of quotes or parentheses against the surrounding script.
/// 2. The decoded contents are parsed again into [`SessionUser`].
///
/// # Errors
/// Returns [`ExtractError::SessionUserNotFound`] if no such call exists or
/// either decode stage yields invalid JSON.
pub fn embedded_session_user(html: &str) -> Result<SessionUser, ExtractError> {
    let call = html
        .find(SESSION_PARSE_CALL)
        .ok_or(ExtractError::SessionUserNotFound)?;
    let argument = &html[call + SESSION_PARSE_CALL.len()..];

    let mut literals = serde_json::Deserializer::from_str(argument).into_iter::<String>();
    let inner = match literals.next() {
        Some(Ok(inner)) => inner,
        _ => return Err(ExtractError::SessionUserNotFound),
    };

    serde_json::from_str(&inner).map_err(|_| ExtractError::SessionUserNotFound)
}

/// Extract the remote project id from a training page
///
/// Looks for a URL path segment of the form `/kata/projects/<hex-id>/` in the
/// raw markup.
///
/// # Errors
/// Returns [`ExtractError::ProjectIdNotFound`] if no such segment exists.
pub fn project_id(html: &str) -> Result<String, ExtractError> {
    let re = Regex::new(r"/kata/projects/([a-f0-9]+)/")
        .map_err(|_| ExtractError::ProjectIdNotFound)?;
    re.captures(html)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or(ExtractError::ProjectIdNotFound)
}

/// Append an export of the first top-level function in starter code
///
/// Finds the first named `function <name>(` declaration and appends a
/// `module.exports` statement referencing it, so the generated test stub can
/// import the symbol.
///
/// # Errors
/// Returns [`ExtractError::FunctionNotFound`] if the starter code contains no
/// function declaration.
pub fn append_export(source: &str) -> Result<ExportedSource, ExtractError> {
    let re = Regex::new(r"function (\w+)\s*\(").map_err(|_| ExtractError::FunctionNotFound)?;
    let function_name = re
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .ok_or(ExtractError::FunctionNotFound)?;

    let source = format!("{source}\n\nmodule.exports = {{{function_name}}};\n");
    Ok(ExportedSource {
        source,
        function_name,
    })
}

/// Turn arbitrary text into a filesystem-safe slug
///
/// Lowercases, collapses every run of non-alphanumeric characters to a single
/// `-`, and trims leading/trailing separators. Pure and total: any input
/// produces a valid token, and the empty string maps to itself (callers
/// handle that degenerate case).
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Map a language name to its source file extension
///
/// Unknown languages fall back to `txt` rather than failing.
#[must_use]
pub fn file_extension(language: &str) -> &'static str {
    match language {
        "javascript" => "js",
        "typescript" => "ts",
        "python" => "py",
        "java" => "java",
        "csharp" => "cs",
        "ruby" => "rb",
        "go" => "go",
        "rust" => "rs",
        _ => "txt",
    }
}

/// Reduce raw `Set-Cookie` header values to a single request-ready header
///
/// Takes the first `;`-delimited segment of each value (the `name=value`
/// pair, dropping attributes like `Path` and `HttpOnly`) and joins them with
/// `"; "`.
pub fn reduce_set_cookie<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse a request-ready cookie header into a key → value map
///
/// Keys are lowercased (the site is inconsistent about cookie-name casing)
/// and values are percent-decoded. Values that fail to decode are kept raw.
#[must_use]
pub fn parse_cookie_pairs(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            let value = urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string());
            Some((key.to_ascii_lowercase(), value))
        })
        .collect()
}
