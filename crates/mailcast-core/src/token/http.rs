//! HTTP client for the channel-token authorization service.

use super::{TokenApi, TokenError};
use crate::config::TokenApiConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Token API client over the authorization service's REST endpoints.
pub struct HttpTokenApi {
    base_url: String,
    client_id: String,
    client_secret: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    access_token: String,
}

impl HttpTokenApi {
    pub fn new(config: &TokenApiConfig) -> Result<Self, TokenError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TokenError::IssueFailed(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            http,
        })
    }
}

#[async_trait]
impl TokenApi for HttpTokenApi {
    async fn issue(&self) -> Result<String, TokenError> {
        let url = format!("{}/oauth/token", self.base_url);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError::IssueFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(TokenError::IssueFailed(format!("{}: {}", status, detail)));
        }

        let issued: IssueResponse = response
            .json()
            .await
            .map_err(|e| TokenError::IssueFailed(e.to_string()))?;

        Ok(issued.access_token)
    }

    async fn revoke(&self, token: &str) -> Result<bool, TokenError> {
        let url = format!("{}/api/revoke", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| TokenError::RevokeFailed(e.to_string()))?;

        // 401 means the token is already dead, which is what revoke wants.
        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::UNAUTHORIZED => Ok(false),
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(TokenError::RevokeFailed(format!("{}: {}", status, detail)))
            }
        }
    }

    async fn status(&self, token: &str) -> Result<bool, TokenError> {
        let url = format!("{}/api/status", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| TokenError::StatusFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::UNAUTHORIZED => Ok(false),
            status => {
                let detail = response.text().await.unwrap_or_default();
                Err(TokenError::StatusFailed(format!("{}: {}", status, detail)))
            }
        }
    }
}
