//! REST side of the chat service: history fetch and message send

use std::sync::Arc;

use serde_json::json;

use super::config::ChatConfig;
use super::message::Message;
use super::ChatError;

/// Thin REST client over the message table. Cheap to clone.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    config: Arc<ChatConfig>,
}

impl RestClient {
    pub fn new(config: Arc<ChatConfig>) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.key)
            .header("Authorization", format!("Bearer {}", self.config.key))
    }

    /// The newest `limit` messages, oldest first.
    ///
    /// The service returns them newest first; they are sorted by id here.
    pub async fn fetch_recent(&self, limit: usize) -> Result<Vec<Message>, ChatError> {
        let url = format!(
            "{}?select=id,name,text,created_at&order=id.desc&limit={limit}",
            self.config.table_url()
        );
        let response = self.authorized(self.http.get(&url)).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut messages: Vec<Message> = response.json().await?;
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }

    /// Post a message. Any 2xx status is success.
    pub async fn send(&self, name: &str, text: &str) -> Result<(), ChatError> {
        let response = self
            .authorized(self.http.post(self.config.table_url()))
            .header("Prefer", "return=minimal")
            .json(&json!({ "name": name, "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
