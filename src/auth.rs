//! Authentication for the admin surface.
//!
//! The display-state endpoint is public: a screen on a wall cannot keep a
//! secret. The admin CRUD surface is guarded by an opaque bearer token
//! obtained from the login (or first-run setup) endpoint:
//!
//! `Authorization: Bearer <token>`
//!
//! A `token` query parameter is accepted as a fallback for clients that
//! cannot set headers (curl one-liners, kiosk browsers).
//!
//! Tokens are opaque: nothing downstream inspects them, they are only looked
//! up in the [`SessionStore`] that issued them. Passwords are stored as
//! SHA-256 hex digests via [`hash_password`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use bedug::{BearerAuth, SessionStore};
//!
//! async fn create_video(
//!     auth: BearerAuth,
//!     // ...
//! ) -> Result<Json<LoopVideo>, (StatusCode, &'static str)> {
//!     sessions.authorize(&auth)?;
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Authentication error returned when token validation fails.
#[derive(Debug, Clone)]
pub struct AuthError {
    /// Error message
    pub message: &'static str,
}

impl AuthError {
    /// Create a new auth error.
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuthError {}

/// An admin account.
///
/// At most one exists; it is created once through the first-run setup flow.
/// The password hash never serializes.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique id (uuid v4)
    pub id: String,
    /// Login name
    pub username: String,
    /// SHA-256 hex digest of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// Create an admin account from an already-hashed password.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Check a cleartext password against the stored hash.
    pub fn password_matches(&self, password: &str) -> bool {
        hash_password(password) == self.password_hash
    }
}

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Bearer token extracted from a request.
///
/// Reads the `Authorization: Bearer …` header first, then falls back to a
/// `token` query parameter. Use [`SessionStore::authorize`] to check it, or
/// [`BearerAuth::validate`] against a fixed value.
#[derive(Debug, Clone, Default)]
pub struct BearerAuth {
    /// The presented token, if any
    pub token: Option<String>,
}

impl BearerAuth {
    /// Create a new BearerAuth with the given token.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    /// Validate the token against an expected value.
    ///
    /// Returns `Ok(())` if tokens match, or `Err(AuthError)` if not.
    pub fn validate(&self, expected: &str) -> Result<(), AuthError> {
        match &self.token {
            Some(token) if token == expected => Ok(()),
            Some(_) => Err(AuthError::new("Invalid token")),
            None => Err(AuthError::new("Missing token")),
        }
    }

    /// Validate the token against an environment variable.
    ///
    /// If the environment variable is not set, authentication is skipped
    /// (open access). This lets deployments enable a static admin token
    /// without a login flow.
    pub fn validate_env(&self, env_var: &str) -> Result<(), AuthError> {
        match std::env::var(env_var) {
            Ok(expected) => self.validate(&expected),
            Err(_) => Ok(()), // No token configured = open access
        }
    }

    /// Check if a token was provided (without validating it).
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Extract a bearer token from an `Authorization` header value.
    pub fn from_header_value(value: &str) -> Self {
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .map(|t| t.trim().to_string());
        Self { token }
    }

    /// Extract the `token` parameter from a query string.
    ///
    /// Useful for manual extraction outside of axum.
    pub fn from_query_string(query: &str) -> Self {
        let params: HashMap<_, _> = form_urlencoded::parse(query.as_bytes()).collect();
        Self {
            token: params.get("token").map(|s| s.to_string()),
        }
    }
}

/// Issues and checks opaque session tokens.
///
/// Tokens are SHA-256 digests over the username, a per-process nonce and a
/// monotone counter; they carry no meaning and are only ever compared
/// against the issued set. Cloning shares the underlying session table.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, String>>>,
    counter: Arc<AtomicU64>,
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for a username.
    pub fn issue(&self, username: &str) -> String {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let count = self.counter.fetch_add(1, Ordering::Relaxed);

        let token = hex::encode(Sha256::digest(
            format!("{username}:{nonce}:{count}").as_bytes(),
        ));
        self.sessions
            .write()
            .unwrap()
            .insert(token.clone(), username.to_string());
        token
    }

    /// The username a token was issued to, if the token is live.
    pub fn username_for(&self, token: &str) -> Option<String> {
        self.sessions.read().unwrap().get(token).cloned()
    }

    /// Check a presented credential against the issued set.
    ///
    /// Returns the session's username on success.
    pub fn authorize(&self, auth: &BearerAuth) -> Result<String, AuthError> {
        let token = auth
            .token
            .as_deref()
            .ok_or_else(|| AuthError::new("Missing token"))?;
        self.username_for(token)
            .ok_or_else(|| AuthError::new("Invalid token"))
    }

    /// Drop a token, ending its session.
    pub fn revoke(&self, token: &str) {
        self.sessions.write().unwrap().remove(token);
    }
}

#[cfg(feature = "axum")]
mod axum_impl {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::request::Parts;
    use axum::http::StatusCode;

    /// Axum extractor for BearerAuth.
    ///
    /// Checks the `Authorization` header, then the `token` query parameter.
    /// Extraction never fails; authorization happens in the handler.
    impl<S> FromRequestParts<S> for BearerAuth
    where
        S: Send + Sync,
    {
        type Rejection = (StatusCode, &'static str);

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Self, Self::Rejection> {
            let from_header = parts
                .headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(BearerAuth::from_header_value)
                .filter(BearerAuth::has_token);

            let auth = match from_header {
                Some(auth) => auth,
                None => parts
                    .uri
                    .query()
                    .map(BearerAuth::from_query_string)
                    .unwrap_or_default(),
            };

            Ok(auth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_auth_validate() {
        let auth = BearerAuth::new(Some("secret123".to_string()));
        assert!(auth.validate("secret123").is_ok());
        assert!(auth.validate("wrong").is_err());
    }

    #[test]
    fn test_bearer_auth_missing() {
        let auth = BearerAuth::new(None);
        assert!(auth.validate("anything").is_err());
    }

    #[test]
    fn test_from_header_value() {
        let auth = BearerAuth::from_header_value("Bearer abc123");
        assert_eq!(auth.token.as_deref(), Some("abc123"));

        let auth = BearerAuth::from_header_value("Basic dXNlcjpwYXNz");
        assert_eq!(auth.token, None);
    }

    #[test]
    fn test_from_query_string() {
        let auth = BearerAuth::from_query_string("token=mysecret&other=value");
        assert_eq!(auth.token, Some("mysecret".to_string()));

        let auth_empty = BearerAuth::from_query_string("other=value");
        assert_eq!(auth_empty.token, None);
    }

    #[test]
    fn test_validate_env_not_set() {
        // When env var is not set, should allow access
        let auth = BearerAuth::new(None);
        assert!(auth.validate_env("NONEXISTENT_VAR_12345").is_ok());
    }

    #[test]
    fn test_password_hashing() {
        let user = AdminUser::new("admin", hash_password("hunter2"));
        assert!(user.password_matches("hunter2"));
        assert!(!user.password_matches("hunter3"));

        // Digest is hex, not the cleartext
        assert_eq!(user.password_hash.len(), 64);
        assert_ne!(user.password_hash, "hunter2");
    }

    #[test]
    fn test_password_hash_never_serializes() {
        let user = AdminUser::new("admin", hash_password("hunter2"));
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"username\":\"admin\""));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_session_issue_and_authorize() {
        let sessions = SessionStore::new();
        let token = sessions.issue("admin");

        let auth = BearerAuth::new(Some(token.clone()));
        assert_eq!(sessions.authorize(&auth).unwrap(), "admin");

        assert!(sessions
            .authorize(&BearerAuth::new(Some("forged".to_string())))
            .is_err());
        assert!(sessions.authorize(&BearerAuth::new(None)).is_err());

        sessions.revoke(&token);
        assert!(sessions.authorize(&auth).is_err());
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let sessions = SessionStore::new();
        let a = sessions.issue("admin");
        let b = sessions.issue("admin");
        assert_ne!(a, b);
    }
}
