use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service summary
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let provider = state.provider.name();
    let writes = if state.config.security.require_auth {
        "session required"
    } else {
        "open"
    };

    Json(json!({
        "name": "House Feedback API",
        "version": version,
        "endpoints": {
            "feedback": format!("/api/feedback[/:id] (list public, writes {})", writes),
            "improvements": format!("/api/improvements[/:id] (list public, writes {})", writes),
            "login": format!("/auth/{}", provider),
            "user": "/auth/user",
            "logout": "/auth/logout",
            "health": "/health",
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let probe = match state.feedback.ping().await {
        Ok(()) => state.improvements.ping().await,
        Err(e) => Err(e),
    };

    match probe {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "error": "database unavailable"
                })),
            )
        }
    }
}
