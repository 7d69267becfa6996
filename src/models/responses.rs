use serde::{Deserialize, Serialize};

/// Response for the listing-created trigger endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSummary {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    #[serde(rename = "cycleId")]
    pub cycle_id: String,
    pub matched: usize,
    pub delivered: usize,
    pub failed: usize,
    #[serde(rename = "tokensCleared")]
    pub tokens_cleared: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
