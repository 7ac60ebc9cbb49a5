use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{ExpiryPolicy, IdentityProvider, SessionStore};
use crate::config::AppConfig;
use crate::database::RecordStore;
use crate::handlers;
use crate::middleware::require_session;
use crate::records::{Feedback, Improvement, RecordFields};

/// Shared request state; everything behind `Arc`, nothing mutable in-process
/// except what the stores guard themselves
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub feedback: Arc<dyn RecordStore<Feedback>>,
    pub improvements: Arc<dyn RecordStore<Improvement>>,
    pub sessions: Arc<dyn SessionStore>,
    pub expiry: Arc<dyn ExpiryPolicy>,
    pub provider: Arc<dyn IdentityProvider>,
}

/// Picks the store for a record type so handlers can stay generic
pub trait HasStore<F: RecordFields> {
    fn store(&self) -> &Arc<dyn RecordStore<F>>;
}

impl HasStore<Feedback> for AppState {
    fn store(&self) -> &Arc<dyn RecordStore<Feedback>> {
        &self.feedback
    }
}

impl HasStore<Improvement> for AppState {
    fn store(&self) -> &Arc<dyn RecordStore<Improvement>> {
        &self.improvements
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(record_routes(&state))
        .merge(auth_routes(&state))
        .with_state(state)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn record_routes(state: &AppState) -> Router<AppState> {
    use handlers::records;

    // Listing is never gated
    let reads = Router::new()
        .route("/api/feedback", get(records::list::<Feedback>))
        .route("/api/improvements", get(records::list::<Improvement>));

    let writes = Router::new()
        .route("/api/feedback", post(records::create::<Feedback>))
        .route(
            "/api/feedback/:id",
            put(records::update::<Feedback>).delete(records::delete::<Feedback>),
        )
        .route("/api/improvements", post(records::create::<Improvement>))
        .route(
            "/api/improvements/:id",
            put(records::update::<Improvement>).delete(records::delete::<Improvement>),
        );

    let writes = if state.config.security.require_auth {
        writes.route_layer(from_fn_with_state(state.clone(), require_session))
    } else {
        writes
    };

    reads.merge(writes)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use handlers::auth;

    let provider = state.provider.name().to_string();

    Router::new()
        .route(&format!("/auth/{}", provider), get(auth::login))
        .route(&format!("/auth/{}/callback", provider), get(auth::callback))
        .route("/auth/user", get(auth::current_user))
        .route("/auth/logout", post(auth::logout))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    // Cookie sessions need credentials, which rule out wildcards
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
