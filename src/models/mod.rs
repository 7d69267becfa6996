// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CategoryFilter, DeliveryFailure, DeliveryResult, HousingType, Listing, NotificationPayload,
    PayloadData, Preference,
};
pub use requests::ListingCreatedEvent;
pub use responses::{DispatchSummary, ErrorResponse, HealthResponse};
