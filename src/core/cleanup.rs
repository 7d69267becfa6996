use crate::models::{DeliveryFailure, DeliveryResult};
use crate::services::store::PreferenceStore;
use futures::future::join_all;
use std::sync::Arc;

/// Removes delivery tokens the push channel reported as permanently invalid
///
/// Only `InvalidToken` failures qualify; timeouts and transient errors
/// leave the stored token alone. Clearing runs concurrently across users
/// and a failed write for one user never affects the others. The whole
/// pass is idempotent: clearing an already absent token is a no-op.
pub struct SubscriptionCleanup {
    store: Arc<dyn PreferenceStore>,
}

impl SubscriptionCleanup {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Inspect a batch of delivery results and clear dead tokens.
    /// Returns the number of tokens actually cleared.
    pub async fn run(&self, results: &[DeliveryResult]) -> usize {
        let invalid: Vec<&str> = results
            .iter()
            .filter(|r| r.failure == Some(DeliveryFailure::InvalidToken))
            .map(|r| r.user_id.as_str())
            .collect();

        if invalid.is_empty() {
            return 0;
        }

        let outcomes = join_all(invalid.into_iter().map(|user_id| async move {
            match self.store.clear_delivery_token(user_id).await {
                Ok(()) => {
                    tracing::info!("Cleared invalid delivery token for user {}", user_id);
                    true
                }
                Err(e) => {
                    // Logged and dropped; no automatic retry
                    tracing::error!(
                        "Error clearing delivery token for user {}: {}",
                        user_id,
                        e
                    );
                    false
                }
            }
        }))
        .await;

        outcomes.into_iter().filter(|cleared| *cleared).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preference;
    use crate::services::store::StoreError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store double tracking tokens per user
    struct MemoryStore {
        tokens: Mutex<HashMap<String, Option<String>>>,
        fail_for: Option<String>,
    }

    impl MemoryStore {
        fn with_tokens(entries: &[(&str, &str)]) -> Self {
            Self {
                tokens: Mutex::new(
                    entries
                        .iter()
                        .map(|(u, t)| (u.to_string(), Some(t.to_string())))
                        .collect(),
                ),
                fail_for: None,
            }
        }

        fn token_of(&self, user_id: &str) -> Option<String> {
            self.tokens.lock().unwrap().get(user_id).cloned().flatten()
        }
    }

    #[async_trait]
    impl PreferenceStore for MemoryStore {
        async fn list_preferences(&self) -> Result<Vec<Preference>, StoreError> {
            Ok(vec![])
        }

        async fn clear_delivery_token(&self, user_id: &str) -> Result<(), StoreError> {
            if self.fail_for.as_deref() == Some(user_id) {
                return Err(StoreError::ApiError("write failed".to_string()));
            }
            // Clearing an absent token stays a no-op
            self.tokens
                .lock()
                .unwrap()
                .insert(user_id.to_string(), None);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_only_invalid_token_failures_trigger_cleanup() {
        let store = Arc::new(MemoryStore::with_tokens(&[
            ("u1", "T1"),
            ("u2", "T2"),
            ("u3", "T3"),
        ]));
        let cleanup = SubscriptionCleanup::new(store.clone());

        let results = vec![
            DeliveryResult::ok("u1"),
            DeliveryResult::failed("u2", DeliveryFailure::InvalidToken),
            DeliveryResult::failed("u3", DeliveryFailure::Timeout),
        ];

        let cleared = cleanup.run(&results).await;

        assert_eq!(cleared, 1);
        assert_eq!(store.token_of("u1"), Some("T1".to_string()));
        assert_eq!(store.token_of("u2"), None);
        assert_eq!(store.token_of("u3"), Some("T3".to_string()));
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let store = Arc::new(MemoryStore::with_tokens(&[("u1", "T1")]));
        let cleanup = SubscriptionCleanup::new(store.clone());

        let results = vec![DeliveryResult::failed("u1", DeliveryFailure::InvalidToken)];

        cleanup.run(&results).await;
        let state_after_first: HashMap<_, _> = store.tokens.lock().unwrap().clone();

        cleanup.run(&results).await;
        let state_after_second: HashMap<_, _> = store.tokens.lock().unwrap().clone();

        assert_eq!(state_after_first, state_after_second);
        assert_eq!(store.token_of("u1"), None);
    }

    #[tokio::test]
    async fn test_one_failed_write_does_not_affect_others() {
        let mut store = MemoryStore::with_tokens(&[("u1", "T1"), ("u2", "T2")]);
        store.fail_for = Some("u1".to_string());
        let store = Arc::new(store);
        let cleanup = SubscriptionCleanup::new(store.clone());

        let results = vec![
            DeliveryResult::failed("u1", DeliveryFailure::InvalidToken),
            DeliveryResult::failed("u2", DeliveryFailure::InvalidToken),
        ];

        let cleared = cleanup.run(&results).await;

        assert_eq!(cleared, 1);
        assert_eq!(store.token_of("u1"), Some("T1".to_string()));
        assert_eq!(store.token_of("u2"), None);
    }

    #[tokio::test]
    async fn test_no_invalid_results_is_a_noop() {
        let store = Arc::new(MemoryStore::with_tokens(&[("u1", "T1")]));
        let cleanup = SubscriptionCleanup::new(store.clone());

        let results = vec![
            DeliveryResult::ok("u1"),
            DeliveryResult::failed("u2", DeliveryFailure::Other),
        ];

        assert_eq!(cleanup.run(&results).await, 0);
        assert_eq!(store.token_of("u1"), Some("T1".to_string()));
    }
}
