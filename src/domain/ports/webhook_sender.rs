//! Port for outbound webhook delivery.

use async_trait::async_trait;

/// Delivery failures feeding the worker's retry state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookDeliveryError {
    /// The endpoint answered outside the 2xx range.
    #[error("webhook endpoint returned status {code}")]
    Status { code: u16 },
    /// The request did not complete within the per-attempt deadline.
    #[error("webhook request timed out: {message}")]
    Timeout { message: String },
    /// Connection, TLS, or protocol failure before a status was received.
    #[error("webhook transport failure: {message}")]
    Transport { message: String },
}

impl WebhookDeliveryError {
    pub fn status(code: u16) -> Self {
        Self::Status { code }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// One HTTP POST of a stored payload to the configured endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// Deliver the payload bytes verbatim. `Ok` means a 2xx response.
    async fn deliver(&self, payload: &[u8]) -> Result<(), WebhookDeliveryError>;
}
