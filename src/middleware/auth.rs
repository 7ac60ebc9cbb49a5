use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::app::AppState;
use crate::auth::{cookie, Identity, Session, SessionError};
use crate::error::ApiError;

/// Authenticated principal, injected into request extensions by the gate
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

/// Whether the request carries a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Session),
}

impl AuthState {
    /// Resolve the session cookie through the session store.
    ///
    /// A cookie that fails verification, names an unknown session, or names an
    /// expired one resolves to `Unauthenticated`; expired sessions are dropped.
    pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Self, SessionError> {
        let security = &state.config.security;

        let Some(token) = cookie::read_cookie(headers, &security.session_cookie) else {
            return Ok(AuthState::Unauthenticated);
        };

        let sid = match cookie::verify_session(&token, &security.session_secret) {
            Ok(sid) => sid,
            Err(e) => {
                tracing::warn!("Rejected session cookie: {}", e);
                return Ok(AuthState::Unauthenticated);
            }
        };

        match state.sessions.get(sid).await? {
            Some(session) if session.is_expired(Utc::now()) => {
                tracing::debug!("Session {} expired at {}", session.id, session.expires_at);
                state.sessions.remove(session.id).await?;
                Ok(AuthState::Unauthenticated)
            }
            Some(session) => Ok(AuthState::Authenticated(session)),
            None => {
                tracing::debug!("Session {} not in store", sid);
                Ok(AuthState::Unauthenticated)
            }
        }
    }
}

/// Gate for mutating routes: rejects before the handler (and its body
/// extraction) runs unless the caller holds a live session
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match AuthState::resolve(&state, request.headers()).await? {
        AuthState::Authenticated(session) => {
            tracing::debug!("Authenticated {} for {}", session.identity.email, request.uri());
            request.extensions_mut().insert(AuthUser(session.identity));
            Ok(next.run(request).await)
        }
        AuthState::Unauthenticated => Err(ApiError::unauthorized("Authentication required")),
    }
}
