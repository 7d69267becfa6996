use crate::models::domain::{HousingType, Listing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Webhook body describing a newly created listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListingCreatedEvent {
    #[validate(length(min = 1))]
    #[serde(alias = "listingId", rename = "id")]
    pub id: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: HousingType,
    pub location: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(alias = "image_url", rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(alias = "house_type", rename = "houseType", default)]
    pub house_type: Option<String>,
    #[serde(alias = "self_contained", rename = "selfContained", default)]
    pub self_contained: Option<bool>,
    #[serde(default)]
    pub fenced: Option<bool>,
    #[serde(alias = "guest_capacity", rename = "guestCapacity", default)]
    pub guest_capacity: Option<u32>,
    #[serde(default)]
    pub amenities: Option<HashMap<String, bool>>,
}

impl ListingCreatedEvent {
    /// The listing value the matching cycle reads; constructed once per event
    pub fn into_listing(self) -> Listing {
        Listing {
            id: self.id,
            title: self.title,
            kind: self.kind,
            location: self.location,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            image_url: self.image_url,
            house_type: self.house_type,
            self_contained: self.self_contained,
            fenced: self.fenced,
            guest_capacity: self.guest_capacity,
            amenities: self.amenities,
        }
    }
}
