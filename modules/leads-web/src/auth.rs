use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Response},
};

use crate::templates::render_login;
use crate::AppState;

pub const COOKIE_NAME: &str = "admin_secret";
const SESSION_DURATION_SECS: i64 = 24 * 3600;

/// Decides who may see the dashboard. Handlers only talk to this trait, so
/// the shared-secret scheme can be swapped out without touching them.
pub trait Authenticator: Send + Sync {
    /// Check a secret typed into the login form or passed as `?secret=`.
    fn check_secret(&self, candidate: &str) -> bool;

    /// Value stored in the session cookie after a successful login.
    fn session_token(&self) -> String;

    /// Check a value read back from the session cookie.
    fn check_session(&self, token: &str) -> bool;
}

/// A single static secret shared by every operator. The cookie carries the
/// secret itself.
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Authenticator for SharedSecret {
    fn check_secret(&self, candidate: &str) -> bool {
        constant_time_eq(candidate.as_bytes(), self.secret.as_bytes())
    }

    fn session_token(&self) -> String {
        self.secret.clone()
    }

    fn check_session(&self, token: &str) -> bool {
        self.check_secret(token)
    }
}

/// Proof that the request is authenticated. Extract this in handlers that
/// require auth; without a valid cookie or `secret` query parameter the
/// request is answered with the login page.
pub struct AdminSession;

impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let cookie_header = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let from_cookie = parse_cookie(cookie_header, COOKIE_NAME)
            .and_then(decode_cookie_value)
            .is_some_and(|token| state.auth.check_session(&token));

        let from_query = parts
            .uri
            .query()
            .and_then(|q| query_param(q, "secret"))
            .is_some_and(|secret| state.auth.check_secret(&secret));

        if from_cookie || from_query {
            Ok(AdminSession)
        } else {
            Err(Html(render_login(None)).into_response())
        }
    }
}

/// Build the Set-Cookie header value for a session token.
pub fn session_cookie(token: &str) -> String {
    let value = encode_cookie_value(token);
    format!(
        "{COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_DURATION_SECS}"
    )
}

/// Build a Set-Cookie header that clears the session.
pub fn clear_session_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Constant-time comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Parse a specific cookie from the Cookie header string.
fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(value) = part.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value);
            }
        }
    }
    None
}

/// First value of `name` in a raw query string.
pub(crate) fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

// Cookie values may not contain `;`, `,`, spaces or quotes, so the token is
// form-urlencoded on the way out and decoded on the way back in.
fn encode_cookie_value(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn decode_cookie_value(encoded: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
}
