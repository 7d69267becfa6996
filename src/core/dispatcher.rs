use crate::core::filters::matches_listing;
use crate::models::{DeliveryFailure, DeliveryResult, Listing, NotificationPayload, Preference};
use crate::services::push::DeliveryChannel;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Fans one notification out to every preference matching a new listing
///
/// Deliveries run concurrently with no ordering guarantee among them; the
/// dispatcher waits for every attempt to settle before returning and never
/// fails fast. Each attempt yields exactly one `DeliveryResult`, so a
/// failed send can never abort or block the others. At most one attempt is
/// made per recipient per listing.
pub struct Dispatcher {
    channel: Arc<dyn DeliveryChannel>,
    delivery_timeout: Duration,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn DeliveryChannel>, delivery_timeout: Duration) -> Self {
        Self {
            channel,
            delivery_timeout,
        }
    }

    /// Run one dispatch cycle for a newly created listing
    pub async fn dispatch(
        &self,
        listing: &Listing,
        preferences: &[Preference],
    ) -> Vec<DeliveryResult> {
        let payload = NotificationPayload::for_listing(listing);

        let attempts: Vec<_> = preferences
            .iter()
            .filter(|pref| {
                let matched = matches_listing(pref, listing);
                if !matched && !pref.eligible() {
                    tracing::debug!(
                        "Skipping user {}: no delivery token or housing type preference",
                        pref.user_id
                    );
                }
                matched
            })
            .map(|pref| self.deliver(pref, &payload))
            .collect();

        // Barrier: completion means every attempt settled, not succeeded
        join_all(attempts).await
    }

    async fn deliver(&self, pref: &Preference, payload: &NotificationPayload) -> DeliveryResult {
        let token = match &pref.delivery_token {
            Some(t) => t,
            // Unreachable past the eligibility gate, but never worth a panic
            None => return DeliveryResult::failed(&pref.user_id, DeliveryFailure::Other),
        };

        let send = self.channel.send(token, payload);
        match tokio::time::timeout(self.delivery_timeout, send).await {
            Ok(Ok(())) => {
                tracing::debug!("Notification sent to user {}", pref.user_id);
                DeliveryResult::ok(&pref.user_id)
            }
            Ok(Err(e)) => {
                tracing::warn!("Error sending notification to user {}: {}", pref.user_id, e);
                DeliveryResult::failed(&pref.user_id, e.classify())
            }
            Err(_) => {
                // Timeout is a transient failure class: the token stays
                tracing::warn!(
                    "Delivery to user {} timed out after {:?}",
                    pref.user_id,
                    self.delivery_timeout
                );
                DeliveryResult::failed(&pref.user_id, DeliveryFailure::Timeout)
            }
        }
    }
}
