use crate::core::{Dispatcher, SubscriptionCleanup};
use crate::models::{DispatchSummary, ErrorResponse, HealthResponse, ListingCreatedEvent};
use crate::services::PreferenceStore;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PreferenceStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub cleanup: Arc<SubscriptionCleanup>,
}

/// Configure all listing-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/listings/event", web::post().to(listing_created));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Listing-created trigger endpoint
///
/// POST /api/v1/listings/event
///
/// Receives one newly created listing, matches it against every stored
/// preference, fans out push notifications, and clears tokens reported as
/// permanently invalid. Partial delivery failure is still a successful
/// cycle; only a failed preference fetch aborts with no deliveries.
async fn listing_created(
    state: web::Data<AppState>,
    req: web::Json<ListingCreatedEvent>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for listing event: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let listing = req.into_inner().into_listing();
    let cycle_id = uuid::Uuid::new_v4();

    tracing::info!(
        "New listing created: {} (ID: {}, cycle: {})",
        listing.title,
        listing.id,
        cycle_id
    );

    // Fetch failure is fatal for the whole cycle: no deliveries attempted
    let preferences = match state.store.list_preferences().await {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::error!("Error fetching preferences, aborting cycle {}: {}", cycle_id, e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to fetch preferences".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    tracing::debug!(
        "Evaluating {} preference records for listing {}",
        preferences.len(),
        listing.id
    );

    let results = state.dispatcher.dispatch(&listing, &preferences).await;
    let delivered = results.iter().filter(|r| r.success).count();
    let failed = results.len() - delivered;

    let tokens_cleared = state.cleanup.run(&results).await;

    tracing::info!(
        "Finished processing listing {}: matched={}, delivered={}, failed={}, tokens_cleared={}",
        listing.id,
        results.len(),
        delivered,
        failed,
        tokens_cleared
    );

    HttpResponse::Ok().json(DispatchSummary {
        listing_id: listing.id,
        cycle_id: cycle_id.to_string(),
        matched: results.len(),
        delivered,
        failed,
        tokens_cleared,
    })
}
