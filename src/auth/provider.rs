use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::session::Identity;
use crate::config::OAuthConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider rejected the login: {0}")]
    Rejected(String),

    #[error("Provider response missing {0}")]
    MissingField(&'static str),

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// External login flow that turns an authorization code into an identity
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Route segment, e.g. `google` for `/auth/google`
    fn name(&self) -> &str;

    /// Where to send the browser to start a login
    fn authorize_url(&self, state: &str) -> String;

    async fn exchange(&self, code: &str) -> Result<Identity, ProviderError>;
}

/// OAuth state value sent to the provider for a nonce kept in a cookie
pub fn state_for_nonce(nonce: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"oauth-state:");
    hasher.update(nonce.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Authorization-code OAuth 2.0 client (Google endpoints by default)
pub struct OAuthProvider {
    config: OAuthConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: Option<String>,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

impl OAuthProvider {
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for OAuthProvider {
    fn name(&self) -> &str {
        &self.config.provider
    }

    fn authorize_url(&self, state: &str) -> String {
        let mut url = match url::Url::parse(&self.config.authorize_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Invalid OAuth authorize URL {}: {}", self.config.authorize_url, e);
                return self.config.authorize_url.clone();
            }
        };
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid profile email")
            .append_pair("state", state);
        url.into()
    }

    async fn exchange(&self, code: &str) -> Result<Identity, ProviderError> {
        let token: TokenResponse = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = token.error {
            let detail = token.error_description.unwrap_or_default();
            return Err(ProviderError::Rejected(format!("{} {}", error, detail).trim().to_string()));
        }
        let access_token = token.access_token.ok_or(ProviderError::MissingField("access_token"))?;

        let info: UserInfo = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let id = info.sub.ok_or(ProviderError::MissingField("sub"))?;
        let email = info.email.ok_or(ProviderError::MissingField("email"))?;
        Ok(Identity {
            name: info.name.unwrap_or_else(|| email.clone()),
            id,
            email,
            picture: info.picture,
        })
    }
}
