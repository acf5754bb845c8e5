use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::{header, HeaderMap, HeaderValue};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};
use uuid::Uuid;

use crate::auth::repo::{Session, User};
use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub(crate) fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub(crate) fn session_cookie(name: &str, token: &str, ttl_minutes: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name,
        token,
        ttl_minutes * 60
    )
}

pub(crate) fn clear_session_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Pull the session token out of the request's Cookie header, if present.
pub(crate) fn cookie_token(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Create a session row for the user and return the Set-Cookie headers
/// the response must carry.
pub async fn open_session(state: &AppState, user: &User) -> Result<HeaderMap, AppError> {
    let token = new_session_token();
    let ttl = state.config.session.ttl_minutes;
    let expires_at = OffsetDateTime::now_utc() + Duration::minutes(ttl);

    Session::create(&state.db, &token, user, expires_at).await?;
    debug!(user_id = %user.id, "session opened");

    let cookie = session_cookie(&state.config.session.cookie_name, &token, ttl);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).context("build session cookie header")?,
    );
    Ok(headers)
}


#[cfg(test)]
mod email_tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("jo@example.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("missing@dot"));
        assert!(!is_valid_email("spaces in@local.part"));
        assert!(!is_valid_email("two@@example.com"));
    }
}

#[cfg(test)]
mod cookie_tests {
    use super::*;

    #[test]
    fn token_is_opaque_and_unique() {
        let a = new_session_token();
        let b = new_session_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn cookie_roundtrip_through_header() {
        let cookie = session_cookie("task_session", "abc123", 60);
        assert!(cookie.starts_with("task_session=abc123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("other=1; task_session=abc123; theme=dark"),
        );
        assert_eq!(
            cookie_token(&headers, "task_session").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn missing_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(cookie_token(&headers, "task_session"), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(cookie_token(&headers, "task_session"), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("task_session");
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("task_session=;"));
    }
}
