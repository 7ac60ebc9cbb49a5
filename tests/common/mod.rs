#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{redirect::Policy, Client};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use house_feedback_api::auth::{
    cookie, session, FixedLifetime, Identity, IdentityProvider, MemorySessionStore, ProviderError,
};
use house_feedback_api::config::AppConfig;
use house_feedback_api::database::MemoryStore;
use house_feedback_api::{router, AppState};

pub const GOOD_CODE: &str = "good-code";
pub const LOGIN_URL: &str = "http://frontend.test/login";
pub const SUCCESS_URL: &str = "http://frontend.test";

/// Identity provider double: accepts a single authorization code
pub struct StaticProvider {
    pub identity: Identity,
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    fn name(&self) -> &str {
        "provider"
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("http://idp.test/authorize?state={}", state)
    }

    async fn exchange(&self, code: &str) -> Result<Identity, ProviderError> {
        if code == GOOD_CODE {
            Ok(self.identity.clone())
        } else {
            Err(ProviderError::Rejected("invalid_grant".to_string()))
        }
    }
}

pub fn test_identity() -> Identity {
    Identity {
        id: "google-108".to_string(),
        name: "Aashika".to_string(),
        email: "aashika@example.com".to_string(),
        picture: Some("http://img.test/a.png".to_string()),
    }
}

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Cookie header value for a freshly issued, stored session
    pub async fn session_cookie(&self) -> Result<String> {
        let session = session::issue(test_identity(), &FixedLifetime::default(), Utc::now());
        let security = &self.state.config.security;
        let token = cookie::sign_session(&session, &security.session_secret)?;
        self.state.sessions.insert(session).await?;
        Ok(format!("{}={}", security.session_cookie, token))
    }
}

/// Start the app in-process on a free port with in-memory stores
pub async fn spawn_server(require_auth: bool) -> Result<TestServer> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut config = AppConfig::development();
    config.security.require_auth = require_auth;
    config.security.session_secret = "test-session-secret".to_string();
    config.frontend.success_url = SUCCESS_URL.to_string();
    config.frontend.login_url = LOGIN_URL.to_string();

    let state = AppState {
        config: Arc::new(config),
        feedback: Arc::new(MemoryStore::new()),
        improvements: Arc::new(MemoryStore::new()),
        sessions: Arc::new(MemorySessionStore::new()),
        expiry: Arc::new(FixedLifetime::default()),
        provider: Arc::new(StaticProvider {
            identity: test_identity(),
        }),
    };

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let app = router(state.clone());
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("test server error: {}", e);
        }
    });

    Ok(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
        handle,
    })
}

/// Client that leaves redirects for the test to inspect
pub fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("reqwest client")
}
