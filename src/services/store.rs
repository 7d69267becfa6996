use crate::models::{CategoryFilter, HousingType, Preference};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with the preference store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read/update access to stored user preferences
///
/// The dispatch cycle needs exactly two operations: read the whole
/// preference set, and clear the delivery token of a single user.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Fetch every preference record. No pagination contract is assumed.
    async fn list_preferences(&self) -> Result<Vec<Preference>, StoreError>;

    /// Remove the stored delivery token for one user. Clearing an already
    /// absent token must be a no-op, not an error.
    async fn clear_delivery_token(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Flat preference document as stored in the backend
///
/// The stored shape keeps all category fields side by side; the conversion
/// into the domain `Preference` builds the category sum type from the
/// `housingType` discriminant at this boundary.
#[derive(Debug, Clone, Deserialize)]
struct PreferenceDoc {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "fcmToken", default)]
    fcm_token: Option<String>,
    #[serde(rename = "housingType", default)]
    housing_type: Option<HousingType>,
    #[serde(default)]
    location: Option<String>,
    #[serde(rename = "minBudget", default)]
    min_budget: Option<f64>,
    #[serde(rename = "maxBudget", default)]
    max_budget: Option<f64>,
    #[serde(default)]
    bedrooms: Option<u32>,
    #[serde(default)]
    bathrooms: Option<u32>,
    #[serde(rename = "houseType", default)]
    house_type: Option<String>,
    #[serde(rename = "selfContained", default)]
    self_contained: Option<bool>,
    #[serde(default)]
    fenced: Option<bool>,
    #[serde(default)]
    guests: Option<u32>,
    #[serde(rename = "airbnbAmenities", default)]
    airbnb_amenities: Option<HashMap<String, bool>>,
}

impl From<PreferenceDoc> for Preference {
    fn from(doc: PreferenceDoc) -> Self {
        let PreferenceDoc {
            user_id,
            fcm_token,
            housing_type,
            location,
            min_budget,
            max_budget,
            bedrooms,
            bathrooms,
            house_type,
            self_contained,
            fenced,
            guests,
            airbnb_amenities,
        } = doc;

        let category = housing_type.map(|kind| match kind {
            HousingType::Permanent => CategoryFilter::Permanent { house_type },
            HousingType::Rental => CategoryFilter::Rental {
                self_contained,
                fenced,
            },
            HousingType::Airbnb => CategoryFilter::Airbnb {
                min_guests: guests,
                required_amenities: airbnb_amenities,
            },
        });

        Preference {
            user_id,
            delivery_token: fcm_token,
            category,
            location,
            min_budget,
            max_budget,
            min_bedrooms: bedrooms,
            min_bathrooms: bathrooms,
        }
    }
}

/// Appwrite-backed preference store
pub struct AppwriteStore {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    preferences_collection: String,
    client: Client,
}

impl AppwriteStore {
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        preferences_collection: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            preferences_collection,
            client,
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.preferences_collection
        )
    }
}

#[async_trait]
impl PreferenceStore for AppwriteStore {
    async fn list_preferences(&self) -> Result<Vec<Preference>, StoreError> {
        // Single request with a high page limit; the preference set is
        // small enough that no pagination contract exists
        let queries = vec!["limit(1000)".to_string()];
        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let url = format!("{}?query={}", self.documents_url(), encoded_queries);

        tracing::debug!("Fetching preference documents from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to fetch preferences: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

        // Malformed documents are skipped rather than failing the cycle
        let preferences: Vec<Preference> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value::<PreferenceDoc>(data.clone()).ok()
            })
            .map(Preference::from)
            .collect();

        tracing::debug!("Loaded {} preference records", preferences.len());

        Ok(preferences)
    }

    async fn clear_delivery_token(&self, user_id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.documents_url(), user_id);

        let payload = serde_json::json!({
            "data": { "fcmToken": Value::Null }
        });

        let response = self
            .client
            .patch(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .json(&payload)
            .send()
            .await?;

        // A missing document means there is no token left to clear
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("No preference document for user {}, nothing to clear", user_id);
            return Ok(());
        }
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(StoreError::ApiError(format!(
                "Failed to clear delivery token: {}",
                response.status()
            )));
        }

        Ok(())
    }
}
