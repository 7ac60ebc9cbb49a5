use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use house_feedback_api::auth::{FixedLifetime, MemorySessionStore, OAuthProvider, SessionStore};
use house_feedback_api::config::{self, StoreBackend};
use house_feedback_api::database::{DatabaseManager, MemoryStore, RecordStore};
use house_feedback_api::records::{Feedback, Improvement};
use house_feedback_api::{router, AppState};

type FeedbackStore = Arc<dyn RecordStore<Feedback>>;
type ImprovementStore = Arc<dyn RecordStore<Improvement>>;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    config.validate().context("invalid configuration")?;
    tracing::info!(
        "Starting House Feedback API in {:?} mode (writes {})",
        config.environment,
        if config.security.require_auth { "require a session" } else { "are open" }
    );

    let state = build_state(config.clone()).await?;
    spawn_session_purge(state.sessions.clone());

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    tracing::info!("Access the API at http://localhost:{}/api/feedback", config.server.port);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn build_state(config: config::AppConfig) -> anyhow::Result<AppState> {
    let provider = Arc::new(OAuthProvider::new(config.oauth.clone()));

    let (feedback, improvements): (FeedbackStore, ImprovementStore) = match config.server.store {
        StoreBackend::Postgres => {
            let (feedback, improvements) = DatabaseManager::open_collections(&config.database)
                .await
                .context("failed to open database")?;
            (Arc::new(feedback) as FeedbackStore, Arc::new(improvements) as ImprovementStore)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; records are lost on restart");
            (
                Arc::new(MemoryStore::<Feedback>::new()) as FeedbackStore,
                Arc::new(MemoryStore::<Improvement>::new()) as ImprovementStore,
            )
        }
    };

    Ok(AppState {
        config: Arc::new(config),
        feedback,
        improvements,
        sessions: Arc::new(MemorySessionStore::new()),
        expiry: Arc::new(FixedLifetime::default()),
        provider,
    })
}

fn spawn_session_purge(sessions: Arc<dyn SessionStore>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            match sessions.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Purged {} expired session(s)", n),
                Err(e) => tracing::error!("Session purge failed: {}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
