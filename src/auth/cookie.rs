use axum::http::{header::COOKIE, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::session::Session;

/// Signed payload carried in the session cookie; the session itself stays server-side
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sid: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum CookieError {
    #[error("Session secret not configured")]
    InvalidSecret,

    #[error("Session cookie signing failed: {0}")]
    Signing(String),

    #[error("Invalid session cookie: {0}")]
    Invalid(String),
}

/// Sign the cookie value for `session`
pub fn sign_session(session: &Session, secret: &str) -> Result<String, CookieError> {
    if secret.is_empty() {
        return Err(CookieError::InvalidSecret);
    }

    let claims = SessionClaims {
        sid: session.id,
        exp: session.expires_at.timestamp(),
        iat: session.issued_at.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CookieError::Signing(e.to_string()))
}

/// Verify signature and expiry, yielding the session id
pub fn verify_session(token: &str, secret: &str) -> Result<Uuid, CookieError> {
    if secret.is_empty() {
        return Err(CookieError::InvalidSecret);
    }

    let mut validation = Validation::default();
    validation.leeway = 0;

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| CookieError::Invalid(e.to_string()))?;

    Ok(data.claims.sid)
}

/// Value of cookie `name` from the request's Cookie headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// `Set-Cookie` value for an HttpOnly, Lax cookie
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes `name`
pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}
