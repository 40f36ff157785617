//! Reqwest-backed webhook sender.
//!
//! Owns transport details only: one POST of the stored payload bytes with a
//! JSON content type and a per-attempt timeout. Classification of the
//! response feeds the worker's retry state machine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{WebhookDeliveryError, WebhookSender};

/// Sender delivering to a single configured endpoint.
pub struct ReqwestWebhookSender {
    client: Client,
    endpoint: Url,
}

impl ReqwestWebhookSender {
    /// Build a sender with an explicit per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl WebhookSender for ReqwestWebhookSender {
    async fn deliver(&self, payload: &[u8]) -> Result<(), WebhookDeliveryError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_vec())
            .send()
            .await
            .map_err(map_transport_error)?;

        classify_status(response.status())
    }
}

fn map_transport_error(error: reqwest::Error) -> WebhookDeliveryError {
    if error.is_timeout() {
        WebhookDeliveryError::timeout(error.to_string())
    } else {
        WebhookDeliveryError::transport(error.to_string())
    }
}

/// A 2xx status is a delivery; anything else feeds the retry machine.
fn classify_status(status: StatusCode) -> Result<(), WebhookDeliveryError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(WebhookDeliveryError::status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::ok(200)]
    #[case::created(201)]
    #[case::no_content(204)]
    #[case::upper_edge(299)]
    fn any_2xx_counts_as_delivered(#[case] code: u16) {
        let status = StatusCode::from_u16(code).expect("valid status");
        assert!(classify_status(status).is_ok());
    }

    #[rstest]
    #[case::redirect(301)]
    #[case::client_error(404)]
    #[case::rate_limited(429)]
    #[case::server_error(500)]
    fn non_2xx_feeds_the_retry_machine(#[case] code: u16) {
        let status = StatusCode::from_u16(code).expect("valid status");
        let error = classify_status(status).expect_err("must be an error");
        assert_eq!(error, WebhookDeliveryError::status(code));
    }
}
