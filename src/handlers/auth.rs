// handlers/auth.rs - OAuth login, session inspection and logout
//
// GET  /auth/:provider           start login, redirect to the provider
// GET  /auth/:provider/callback  finish login, set session cookie, redirect to the front end
// GET  /auth/user                who is logged in (never 401)
// POST /auth/logout              destroy the session

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Json, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{cookie, provider::state_for_nonce, session};
use crate::middleware::AuthState;

/// Cookie holding the OAuth nonce between login and callback
pub const STATE_COOKIE: &str = "oauth_state";
const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /auth/:provider - redirect to the identity provider
pub async fn login(State(state): State<AppState>) -> Response {
    let nonce = Uuid::new_v4().simple().to_string();
    let target = state.provider.authorize_url(&state_for_nonce(&nonce));
    let state_cookie = cookie::set_cookie(
        STATE_COOKIE,
        &nonce,
        STATE_COOKIE_MAX_AGE_SECS,
        state.config.security.secure_cookies,
    );

    (AppendHeaders([(SET_COOKIE, state_cookie)]), Redirect::to(&target)).into_response()
}

/// GET /auth/:provider/callback - establish a session or bounce to the login page
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response {
    let secure = state.config.security.secure_cookies;
    let clear_state = cookie::clear_cookie(STATE_COOKIE, secure);

    match complete_login(&state, &query, &headers).await {
        Ok(session_cookie) => (
            AppendHeaders([(SET_COOKIE, session_cookie), (SET_COOKIE, clear_state)]),
            Redirect::to(&state.config.frontend.success_url),
        )
            .into_response(),
        Err(reason) => {
            tracing::warn!("Login via {} failed: {}", state.provider.name(), reason);
            (
                AppendHeaders([(SET_COOKIE, clear_state)]),
                Redirect::to(&state.config.frontend.login_url),
            )
                .into_response()
        }
    }
}

/// Verify the OAuth state, exchange the code, and store a session.
/// Returns the `Set-Cookie` value for the new session.
async fn complete_login(
    state: &AppState,
    query: &CallbackQuery,
    headers: &HeaderMap,
) -> Result<String, String> {
    if let Some(error) = &query.error {
        return Err(format!("provider returned error: {}", error));
    }

    let nonce = cookie::read_cookie(headers, STATE_COOKIE).ok_or("missing state cookie")?;
    match &query.state {
        Some(s) if *s == state_for_nonce(&nonce) => {}
        _ => return Err("state mismatch".to_string()),
    }

    let code = query.code.as_deref().ok_or("missing authorization code")?;
    let identity = state.provider.exchange(code).await.map_err(|e| e.to_string())?;

    let session = session::issue(identity, state.expiry.as_ref(), Utc::now());
    let security = &state.config.security;
    let token = cookie::sign_session(&session, &security.session_secret).map_err(|e| e.to_string())?;
    let max_age = (session.expires_at - session.issued_at).num_seconds();

    tracing::info!("Session {} issued for {}", session.id, session.identity.email);
    state.sessions.insert(session).await.map_err(|e| e.to_string())?;

    Ok(cookie::set_cookie(
        &security.session_cookie,
        &token,
        max_age,
        security.secure_cookies,
    ))
}

/// GET /auth/user - current identity, if any
pub async fn current_user(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match AuthState::resolve(&state, &headers).await {
        Ok(AuthState::Authenticated(session)) => Json(json!({
            "authenticated": true,
            "user": {
                "id": session.identity.id,
                "name": session.identity.name,
                "email": session.identity.email,
                "picture": session.identity.picture,
            }
        }))
        .into_response(),
        Ok(AuthState::Unauthenticated) => Json(json!({ "authenticated": false })).into_response(),
        Err(e) => {
            tracing::error!("Session lookup failed: {}", e);
            Json(json!({ "authenticated": false })).into_response()
        }
    }
}

/// POST /auth/logout - destroy the session and clear the cookie
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let security = &state.config.security;

    let resolved = AuthState::resolve(&state, &headers).await;
    let destroyed = match resolved {
        Ok(AuthState::Authenticated(session)) => state.sessions.remove(session.id).await.map(|_| ()),
        Ok(AuthState::Unauthenticated) => Ok(()),
        Err(e) => Err(e),
    };

    if let Err(e) = destroyed {
        tracing::error!("Logout failed: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to logout" })),
        )
            .into_response();
    }

    (
        AppendHeaders([(
            SET_COOKIE,
            cookie::clear_cookie(&security.session_cookie, security.secure_cookies),
        )]),
        Json(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}
