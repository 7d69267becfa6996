//! Nyumba Alerts - Push notification matching service for the Nyumba housing app
//!
//! Reacts to newly created listings, matches them against per-user
//! preference criteria, fans out push notifications concurrently, and
//! cleans up permanently invalid delivery tokens.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{matches_listing, Dispatcher, SubscriptionCleanup};
pub use models::{
    CategoryFilter, DeliveryFailure, DeliveryResult, DispatchSummary, HousingType, Listing,
    ListingCreatedEvent, NotificationPayload, Preference,
};
