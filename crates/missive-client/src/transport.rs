//! Outbound edit requests.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use missive_shared::constants::EDIT_MSG_PATH;
use missive_shared::types::ContentType;

use crate::config::EditConfig;

/// An edit addressed by server sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(rename = "conversationID")]
    pub conversation_id: String,
    pub seq: i64,
    pub new_content: String,
    pub content_type: ContentType,
}

/// Carries edit requests to the server.  Returning `Ok` means the server
/// acknowledged the edit.
#[async_trait]
pub trait EditTransport: Send + Sync {
    async fn send_edit(&self, request: &EditRequest) -> anyhow::Result<()>;
}

/// [`EditTransport`] over the messaging HTTP API.
pub struct HttpEditTransport {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpEditTransport {
    pub fn new(config: &EditConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.server_url.trim_end_matches('/'), EDIT_MSG_PATH),
            token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EditTransport for HttpEditTransport {
    async fn send_edit(&self, request: &EditRequest) -> anyhow::Result<()> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.token {
            builder = builder.header("token", token);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("server responded {status}: {body}");
        }

        debug!(
            conversation_id = %request.conversation_id,
            seq = request.seq,
            "edit acknowledged by server"
        );
        Ok(())
    }
}
