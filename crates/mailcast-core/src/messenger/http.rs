//! HTTP messenger backed by the chat platform's bot API.

use super::{GroupSummary, Messenger, MessengerError};
use crate::config::MessagingConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Messenger that talks to the platform's REST bot API.
pub struct HttpMessenger {
    base_url: String,
    channel_token: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GroupSummaryResponse {
    #[serde(rename = "groupId")]
    group_id: String,
    #[serde(rename = "groupName")]
    group_name: String,
}

impl HttpMessenger {
    pub fn new(config: &MessagingConfig) -> Result<Self, MessengerError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MessengerError::RequestFailed(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            channel_token: config.channel_token.clone(),
            http,
        })
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn send(&self, target_id: &str, text: &str) -> Result<(), MessengerError> {
        let url = format!("{}/v2/bot/message/push", self.base_url);
        let body = json!({
            "to": target_id,
            "messages": [{
                "type": "text",
                "text": text,
            }],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.channel_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MessengerError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MessengerError::SendFailed(format!("{}: {}", status, detail)));
        }

        Ok(())
    }

    async fn get_group_summary(&self, target_id: &str) -> Result<GroupSummary, MessengerError> {
        let url = format!("{}/v2/bot/group/{}/summary", self.base_url, target_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.channel_token)
            .send()
            .await
            .map_err(|e| MessengerError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MessengerError::UnexpectedResponse(format!(
                "{}: {}",
                status, detail
            )));
        }

        let summary: GroupSummaryResponse = response
            .json()
            .await
            .map_err(|e| MessengerError::UnexpectedResponse(e.to_string()))?;

        Ok(GroupSummary {
            target_id: summary.group_id,
            name: summary.group_name,
        })
    }

    async fn check_membership(
        &self,
        target_id: &str,
        subject_id: &str,
    ) -> Result<bool, MessengerError> {
        let url = format!(
            "{}/v2/bot/group/{}/member/{}",
            self.base_url, target_id, subject_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.channel_token)
            .send()
            .await
            .map_err(|e| MessengerError::RequestFailed(e.to_string()))?;

        // The platform answers 404 for a subject that is not in the group.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        if response.status().is_success() {
            return Ok(true);
        }

        let status = response.status();
        let detail = response.text().await.unwrap_or_default();
        Err(MessengerError::UnexpectedResponse(format!(
            "{}: {}",
            status, detail
        )))
    }
}
