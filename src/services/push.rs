use crate::models::{DeliveryFailure, NotificationPayload};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// FCM error codes that mark a token as permanently dead
///
/// A fixed, enumerable set; anything else is a transient delivery failure
/// and must not trigger token cleanup.
const INVALID_TOKEN_ERRORS: &[&str] = &["InvalidRegistration", "NotRegistered"];

/// Errors that can occur when sending a push notification
#[derive(Debug, Error)]
pub enum PushError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("delivery token rejected as invalid: {0}")]
    InvalidToken(String),

    #[error("push service returned error: {0}")]
    ServiceError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl PushError {
    /// Map an error onto the delivery failure classification
    pub fn classify(&self) -> DeliveryFailure {
        match self {
            PushError::InvalidToken(_) => DeliveryFailure::InvalidToken,
            _ => DeliveryFailure::Other,
        }
    }
}

/// A push-token-based delivery channel
///
/// The only channel the design assumes; injected into the dispatcher so
/// tests can substitute a double.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver one payload to one device token
    async fn send(&self, token: &str, payload: &NotificationPayload) -> Result<(), PushError>;
}

/// FCM HTTP client (legacy send endpoint)
pub struct FcmClient {
    endpoint: String,
    server_key: String,
    client: Client,
}

impl FcmClient {
    pub fn new(endpoint: String, server_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            endpoint,
            server_key,
            client,
        }
    }
}

#[async_trait]
impl DeliveryChannel for FcmClient {
    async fn send(&self, token: &str, payload: &NotificationPayload) -> Result<(), PushError> {
        let body = serde_json::json!({
            "to": token,
            "notification": {
                "title": payload.title,
                "body": payload.body,
                "image": payload.image_url,
            },
            "data": {
                "listingId": payload.data.listing_id,
                "screen": payload.data.screen,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PushError::ServiceError(format!(
                "FCM returned {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let failure_count = json.get("failure").and_then(|f| f.as_u64()).unwrap_or(0);
        if failure_count == 0 {
            let success_count = json.get("success").and_then(|s| s.as_u64()).unwrap_or(0);
            tracing::debug!(
                "Notification accepted: success={}, failure={}",
                success_count,
                failure_count
            );
            return Ok(());
        }

        // One token per request, so the first result carries the error
        let error = json
            .get("results")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
            .and_then(|r| r.get("error"))
            .and_then(|e| e.as_str())
            .ok_or_else(|| PushError::InvalidResponse("Missing results error".into()))?;

        if INVALID_TOKEN_ERRORS.contains(&error) {
            Err(PushError::InvalidToken(error.to_string()))
        } else {
            Err(PushError::ServiceError(error.to_string()))
        }
    }
}
