//! Session/token accessor.
//!
//! The authenticated session is two cookies: `USR` carries the backend bearer
//! token, `UID` the user's id. Both are written `SameSite=Strict` (and
//! `Secure` on HTTPS deployments) with a `maxAge`; there is no refresh or
//! rotation, expiry is whatever the cookie carries. Logout overwrites both
//! with an expiry in the past.
//!
//! All cookie access goes through [`SessionRepository`], which is built once
//! from configuration and shared through application state. Server-side
//! per-visitor state (cart snapshot, checkouts) lives in [`store`].

pub mod cookies;
pub mod store;

use axum::http::HeaderMap;
use bettabeal_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;

pub use cookies::CookieOptions;

/// Cookie holding the bearer token.
pub const TOKEN_COOKIE: &str = "USR";

/// Cookie holding the user id.
pub const USER_ID_COOKIE: &str = "UID";

/// An authenticated visitor.
///
/// The token is kept secret so it never ends up in logs via `Debug`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    token: SecretString,
    user_id: Option<UserId>,
}

impl AuthSession {
    /// Create a session from a bearer token and optional user id.
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: Option<UserId>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user_id,
        }
    }

    /// The backend bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// The logged-in user's id, if the `UID` cookie was present.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }
}

/// Reads and writes the session cookies.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    secure: bool,
    max_age: Duration,
}

impl SessionRepository {
    /// Create a repository.
    ///
    /// # Arguments
    ///
    /// * `secure` - Whether cookies carry the `Secure` attribute
    /// * `max_age_seconds` - Cookie lifetime
    #[must_use]
    pub fn new(secure: bool, max_age_seconds: i64) -> Self {
        Self {
            secure,
            max_age: Duration::seconds(max_age_seconds),
        }
    }

    /// Read a raw cookie value.
    #[must_use]
    pub fn get(&self, headers: &HeaderMap, name: &str) -> Option<String> {
        cookies::get(headers, name)
    }

    /// Write a raw cookie value.
    pub fn set(&self, headers: &mut HeaderMap, name: &str, value: &str, options: CookieOptions) {
        cookies::set(headers, &cookies::build(name, value, options));
    }

    /// Load the authenticated session from request cookies.
    ///
    /// Returns `None` when no token cookie is present. A malformed `UID` is
    /// ignored rather than invalidating the session.
    #[must_use]
    pub fn load(&self, headers: &HeaderMap) -> Option<AuthSession> {
        let token = self.get(headers, TOKEN_COOKIE)?;
        let user_id = self
            .get(headers, USER_ID_COOKIE)
            .and_then(|raw| raw.parse::<UserId>().ok());
        Some(AuthSession::new(token, user_id))
    }

    /// Write both session cookies onto a response.
    pub fn store(&self, headers: &mut HeaderMap, session: &AuthSession) {
        let options = self.options();
        self.set(headers, TOKEN_COOKIE, session.token().expose_secret(), options);
        if let Some(user_id) = session.user_id() {
            self.set(headers, USER_ID_COOKIE, &user_id.to_string(), options);
        }
    }

    /// Expire both session cookies.
    pub fn clear(&self, headers: &mut HeaderMap) {
        let options = CookieOptions::expired(self.secure, Some(SameSite::Strict));
        self.set(headers, TOKEN_COOKIE, "", options);
        self.set(headers, USER_ID_COOKIE, "", options);
    }

    fn options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.secure,
            same_site: Some(SameSite::Strict),
            max_age: Some(self.max_age),
            expires: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{HeaderValue, header};

    use super::*;

    fn with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_load_requires_token() {
        let repo = SessionRepository::new(true, 3600);
        assert!(repo.load(&HeaderMap::new()).is_none());
        assert!(repo.load(&with_cookie("UID=5")).is_none());
    }

    #[test]
    fn test_load_reads_token_and_user() {
        let repo = SessionRepository::new(true, 3600);
        let session = repo.load(&with_cookie("USR=tok; UID=5")).unwrap();
        assert_eq!(session.token().expose_secret(), "tok");
        assert_eq!(session.user_id(), Some(UserId::new(5)));
    }

    #[test]
    fn test_load_ignores_malformed_user_id() {
        let repo = SessionRepository::new(true, 3600);
        let session = repo.load(&with_cookie("USR=tok; UID=abc")).unwrap();
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn test_store_sets_strict_cookies() {
        let repo = SessionRepository::new(true, 3600);
        let mut headers = HeaderMap::new();
        repo.store(&mut headers, &AuthSession::new("tok", Some(UserId::new(9))));

        let cookies: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("SameSite=Strict")));
        assert!(cookies.iter().all(|c| c.contains("Secure")));
        assert!(cookies.iter().any(|c| c.starts_with("USR=tok")));
        assert!(cookies.iter().any(|c| c.starts_with("UID=9")));
    }

    #[test]
    fn test_clear_expires_both() {
        let repo = SessionRepository::new(false, 3600);
        let mut headers = HeaderMap::new();
        repo.clear(&mut headers);

        let cookies: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("1970")));
    }

    #[test]
    fn test_debug_hides_token() {
        let session = AuthSession::new("super-secret-token", None);
        assert!(!format!("{session:?}").contains("super-secret-token"));
    }
}
