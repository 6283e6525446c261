use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::super::domain::{PriorityTier, RecordId};
use super::channel::Channel;

/// Payload handed to a transport; already rendered for its channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub channel: Channel,
    pub priority: PriorityTier,
    pub record_id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Transport failure; recorded per channel by the dispatcher and never propagated.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("transport rejected message with status {status}")]
    Rejected { status: u16 },
}

/// Outbound hook for one channel (SMS gateway, e-mail relay, staff webhook).
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    fn channel(&self) -> Channel;
    async fn send(&self, message: &NotificationMessage) -> Result<(), TransportError>;
}

/// Posts rendered messages as JSON to a relay endpoint.
pub struct HttpTransport {
    channel: Channel,
    endpoint: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(channel: Channel, endpoint: impl Into<String>, auth_token: Option<String>) -> Self {
        Self::with_client(channel, endpoint, auth_token, reqwest::Client::new())
    }

    pub fn with_client(
        channel: Channel,
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            channel,
            endpoint: endpoint.into(),
            auth_token,
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("channel", &self.channel)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationTransport for HttpTransport {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), TransportError> {
        let mut request = self.client.post(&self.endpoint).json(message);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| TransportError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
