use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Housing category discriminant, shared by listings and preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HousingType {
    Permanent,
    Rental,
    Airbnb,
}

impl std::fmt::Display for HousingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HousingType::Permanent => "permanent",
            HousingType::Rental => "rental",
            HousingType::Airbnb => "airbnb",
        };
        f.write_str(label)
    }
}

/// Category-specific matching criteria.
///
/// Each variant carries only the fields that make sense for its housing
/// type, so a rental filter can never be applied to a permanent listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CategoryFilter {
    Permanent {
        house_type: Option<String>,
    },
    Rental {
        self_contained: Option<bool>,
        fenced: Option<bool>,
    },
    Airbnb {
        min_guests: Option<u32>,
        required_amenities: Option<HashMap<String, bool>>,
    },
}

impl CategoryFilter {
    pub fn housing_type(&self) -> HousingType {
        match self {
            CategoryFilter::Permanent { .. } => HousingType::Permanent,
            CategoryFilter::Rental { .. } => HousingType::Rental,
            CategoryFilter::Airbnb { .. } => HousingType::Airbnb,
        }
    }
}

/// A user's stored notification preferences
///
/// Every filter field is optional; an absent field places no constraint on
/// that axis. A record without a delivery token or category is skipped
/// before any filter runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preference {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "deliveryToken", default)]
    pub delivery_token: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryFilter>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "minBudget", default)]
    pub min_budget: Option<f64>,
    #[serde(rename = "maxBudget", default)]
    pub max_budget: Option<f64>,
    #[serde(rename = "minBedrooms", default)]
    pub min_bedrooms: Option<u32>,
    #[serde(rename = "minBathrooms", default)]
    pub min_bathrooms: Option<u32>,
}

impl Preference {
    /// A preference can only ever match if the user finished subscribing:
    /// both a delivery token and a housing category must be present.
    pub fn eligible(&self) -> bool {
        self.delivery_token.is_some() && self.category.is_some()
    }
}

/// A newly created listing, immutable for the duration of one dispatch cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: HousingType,
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "houseType", default)]
    pub house_type: Option<String>,
    #[serde(rename = "selfContained", default)]
    pub self_contained: Option<bool>,
    #[serde(default)]
    pub fenced: Option<bool>,
    #[serde(rename = "guestCapacity", default)]
    pub guest_capacity: Option<u32>,
    #[serde(default)]
    pub amenities: Option<HashMap<String, bool>>,
}

/// Push notification content for one matched listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub data: PayloadData,
}

/// Data block carried alongside the notification for client-side navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadData {
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub screen: String,
}

impl NotificationPayload {
    /// Build the payload sent to every recipient matched against `listing`
    pub fn for_listing(listing: &Listing) -> Self {
        Self {
            title: format!("New {} property available!", listing.kind),
            body: format!(
                "{} in {} for ${}. Check it out!",
                listing.title, listing.location, listing.price
            ),
            image_url: listing.image_url.clone(),
            data: PayloadData {
                listing_id: listing.id.clone(),
                screen: "listingDetail".to_string(),
            },
        }
    }
}

/// Classification of a failed delivery attempt
///
/// Only `InvalidToken` marks the token as permanently dead and feeds the
/// cleanup pass; timeouts and transient errors leave the token untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFailure {
    InvalidToken,
    Timeout,
    Other,
}

/// Outcome of one delivery attempt within a dispatch cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryResult {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<DeliveryFailure>,
}

impl DeliveryResult {
    pub fn ok(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            success: true,
            failure: None,
        }
    }

    pub fn failed(user_id: &str, failure: DeliveryFailure) -> Self {
        Self {
            user_id: user_id.to_string(),
            success: false,
            failure: Some(failure),
        }
    }
}
