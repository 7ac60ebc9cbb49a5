use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub oauth: OAuthConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub store: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Pool acquire timeout, seconds
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Gate mutating routes behind a session (the protected variant)
    pub require_auth: bool,
    pub session_secret: String,
    pub session_cookie: String,
    pub secure_cookies: bool,
    /// Empty means permissive CORS without credentials
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub provider: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Where a successful login lands
    pub success_url: String,
    /// Where a failed login lands
    pub login_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SESSION_SECRET must be set in {0:?}")]
    MissingSessionSecret(Environment),

    #[error("AUTH_REQUIRED needs GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET")]
    MissingOAuthCredentials,
}

const DEV_SESSION_SECRET: &str = "dev-only-session-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("STORE") {
            self.server.store = match v.as_str() {
                "memory" => StoreBackend::Memory,
                _ => StoreBackend::Postgres,
            };
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("AUTH_REQUIRED") {
            self.security.require_auth = v.parse().unwrap_or(self.security.require_auth);
        }
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.security.session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.security.session_cookie = v;
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // OAuth overrides
        if let Ok(v) = env::var("GOOGLE_CLIENT_ID") {
            self.oauth.client_id = v;
        }
        if let Ok(v) = env::var("GOOGLE_CLIENT_SECRET") {
            self.oauth.client_secret = v;
        }
        if let Ok(v) = env::var("OAUTH_CALLBACK_URL") {
            self.oauth.callback_url = v;
        }

        // Frontend overrides
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.frontend.login_url = format!("{}/login", v.trim_end_matches('/'));
            self.frontend.success_url = v;
        }
        if let Ok(v) = env::var("LOGIN_URL") {
            self.frontend.login_url = v;
        }

        self
    }

    /// Refuse configurations that would run insecurely
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment != Environment::Development
            && (self.security.session_secret.is_empty()
                || self.security.session_secret == DEV_SESSION_SECRET)
        {
            return Err(ConfigError::MissingSessionSecret(self.environment));
        }
        if self.security.require_auth
            && (self.oauth.client_id.is_empty() || self.oauth.client_secret.is_empty())
        {
            return Err(ConfigError::MissingOAuthCredentials);
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                store: StoreBackend::Postgres,
            },
            database: DatabaseConfig {
                url: Some("postgres://localhost:5432/studentFeedbackDB".to_string()),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                require_auth: false,
                session_secret: DEV_SESSION_SECRET.to_string(),
                session_cookie: "feedback.sid".to_string(),
                secure_cookies: false,
                cors_origins: Vec::new(),
            },
            oauth: OAuthConfig::google("http://localhost:5000/auth/google/callback"),
            frontend: FrontendConfig {
                success_url: "http://localhost:5173".to_string(),
                login_url: "http://localhost:5173/login".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5000,
                store: StoreBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                require_auth: true,
                session_secret: String::new(),
                session_cookie: "feedback.sid".to_string(),
                secure_cookies: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            oauth: OAuthConfig::google("https://staging-api.example.com/auth/google/callback"),
            frontend: FrontendConfig {
                success_url: "https://staging.example.com".to_string(),
                login_url: "https://staging.example.com/login".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5000,
                store: StoreBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                require_auth: true,
                session_secret: String::new(),
                session_cookie: "feedback.sid".to_string(),
                secure_cookies: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            oauth: OAuthConfig::google("https://api.example.com/auth/google/callback"),
            frontend: FrontendConfig {
                success_url: "https://app.example.com".to_string(),
                login_url: "https://app.example.com/login".to_string(),
            },
        }
    }
}

impl OAuthConfig {
    fn google(callback_url: &str) -> Self {
        Self {
            provider: "google".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            callback_url: callback_url.to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
