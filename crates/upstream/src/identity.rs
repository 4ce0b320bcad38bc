use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::{UpstreamError, base_url, status_error};

/// The external identity behind a bearer credential.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer credential. Returns `UpstreamError::Rejected` when
    /// the provider does not accept it.
    async fn resolve(&self, token: &str) -> Result<Identity, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Supabase Auth (`GET /auth/v1/user`).
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    endpoint: Url,
    anon_key: String,
    http: reqwest::Client,
}

impl SupabaseAuth {
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let endpoint = base_url(url)?
            .join("auth/v1/user")
            .map_err(|err| UpstreamError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            endpoint,
            anon_key: anon_key.into(),
            http: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn resolve(&self, token: &str) -> Result<Identity, UpstreamError> {
        let res = self
            .http
            .get(self.endpoint.clone())
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(UpstreamError::Rejected),
            status if !status.is_success() => return Err(status_error(res).await),
            _ => {}
        }

        let user = res
            .json::<AuthUser>()
            .await
            .map_err(|err| UpstreamError::InvalidResponse(err.to_string()))?;
        Ok(Identity {
            subject: user.id,
            email: user.email.filter(|email| !email.trim().is_empty()),
        })
    }
}
