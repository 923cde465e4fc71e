//! HTTP identity provider backed by the platform's OAuth login endpoints.

use super::{IdentityProfile, IdentityProvider, IdentityProviderError};
use crate::config::IdentityConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity provider that exchanges authorization codes over HTTP.
pub struct HttpIdentityProvider {
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityProviderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IdentityProviderError::ExchangeFailed(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            http,
        })
    }

    async fn exchange_code(&self, artifact: &str) -> Result<String, IdentityProviderError> {
        let url = format!("{}/oauth2/v2.1/token", self.base_url);
        let form = [
            ("grant_type", "authorization_code"),
            ("code", artifact),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| IdentityProviderError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(IdentityProviderError::ExchangeFailed(format!(
                "{}: {}",
                status, detail
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityProviderError::UnexpectedResponse(e.to_string()))?;

        Ok(token.access_token)
    }

    async fn fetch_profile(
        &self,
        access_token: &str,
    ) -> Result<IdentityProfile, IdentityProviderError> {
        let url = format!("{}/v2/profile", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| IdentityProviderError::ExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(IdentityProviderError::UnexpectedResponse(format!(
                "{}: {}",
                status, detail
            )));
        }

        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| IdentityProviderError::UnexpectedResponse(e.to_string()))?;

        Ok(IdentityProfile {
            subject_id: profile.user_id,
            display_name: profile.display_name,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange(&self, artifact: &str) -> Result<IdentityProfile, IdentityProviderError> {
        let access_token = self.exchange_code(artifact).await?;
        self.fetch_profile(&access_token).await
    }
}
