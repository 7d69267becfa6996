// Integration tests for Nyumba Alerts: full dispatch + cleanup cycles
// driven through the store and delivery-channel seams with test doubles.

use async_trait::async_trait;
use nyumba_alerts::core::{Dispatcher, SubscriptionCleanup};
use nyumba_alerts::models::{
    CategoryFilter, DeliveryFailure, DeliveryResult, HousingType, Listing, NotificationPayload,
    Preference,
};
use nyumba_alerts::services::{DeliveryChannel, PreferenceStore, PushError, StoreError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory preference store double
struct MemoryStore {
    preferences: Mutex<Vec<Preference>>,
}

impl MemoryStore {
    fn new(preferences: Vec<Preference>) -> Self {
        Self {
            preferences: Mutex::new(preferences),
        }
    }

    fn token_of(&self, user_id: &str) -> Option<String> {
        self.preferences
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .and_then(|p| p.delivery_token.clone())
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn list_preferences(&self) -> Result<Vec<Preference>, StoreError> {
        Ok(self.preferences.lock().unwrap().clone())
    }

    async fn clear_delivery_token(&self, user_id: &str) -> Result<(), StoreError> {
        let mut prefs = self.preferences.lock().unwrap();
        if let Some(pref) = prefs.iter_mut().find(|p| p.user_id == user_id) {
            pref.delivery_token = None;
        }
        Ok(())
    }
}

/// Delivery channel double that rejects scripted tokens
struct FakeChannel {
    dead_tokens: HashSet<String>,
    sent: Mutex<Vec<String>>,
}

impl FakeChannel {
    fn new(dead_tokens: &[&str]) -> Self {
        Self {
            dead_tokens: dead_tokens.iter().map(|t| t.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeliveryChannel for FakeChannel {
    async fn send(&self, token: &str, _payload: &NotificationPayload) -> Result<(), PushError> {
        self.sent.lock().unwrap().push(token.to_string());
        if self.dead_tokens.contains(token) {
            return Err(PushError::InvalidToken("NotRegistered".to_string()));
        }
        Ok(())
    }
}

fn rental_listing() -> Listing {
    Listing {
        id: "listing_42".to_string(),
        title: "Garden flat".to_string(),
        kind: HousingType::Rental,
        location: "Austin".to_string(),
        price: 1800.0,
        bedrooms: 2,
        bathrooms: 1,
        image_url: None,
        house_type: None,
        self_contained: None,
        fenced: None,
        guest_capacity: None,
        amenities: None,
    }
}

fn rental_pref(user_id: &str, token: Option<&str>) -> Preference {
    Preference {
        user_id: user_id.to_string(),
        delivery_token: token.map(str::to_string),
        category: Some(CategoryFilter::Rental {
            self_contained: None,
            fenced: None,
        }),
        location: None,
        min_budget: None,
        max_budget: None,
        min_bedrooms: None,
        min_bathrooms: None,
    }
}

fn airbnb_pref(user_id: &str, token: &str, min_guests: Option<u32>) -> Preference {
    Preference {
        user_id: user_id.to_string(),
        delivery_token: Some(token.to_string()),
        category: Some(CategoryFilter::Airbnb {
            min_guests,
            required_amenities: None,
        }),
        location: None,
        min_budget: None,
        max_budget: None,
        min_bedrooms: None,
        min_bathrooms: None,
    }
}

#[tokio::test]
async fn test_full_cycle_delivers_and_cleans_up() {
    let preferences = vec![
        rental_pref("u1", Some("T1")),          // matches, delivery ok
        rental_pref("u2", Some("DEAD")),        // matches, token invalid
        rental_pref("u3", None),                // ineligible
        airbnb_pref("u4", "T4", Some(2)),       // wrong category
    ];

    let store = Arc::new(MemoryStore::new(preferences));
    let channel = Arc::new(FakeChannel::new(&["DEAD"]));
    let dispatcher = Dispatcher::new(channel.clone(), Duration::from_secs(5));
    let cleanup = SubscriptionCleanup::new(store.clone());

    let listing = rental_listing();
    let loaded = store.list_preferences().await.unwrap();
    let results = dispatcher.dispatch(&listing, &loaded).await;

    assert_eq!(results.len(), 2);
    assert!(results.contains(&DeliveryResult::ok("u1")));
    assert!(results.contains(&DeliveryResult::failed("u2", DeliveryFailure::InvalidToken)));

    let cleared = cleanup.run(&results).await;
    assert_eq!(cleared, 1);

    // Only the invalid token is removed
    assert_eq!(store.token_of("u1"), Some("T1".to_string()));
    assert_eq!(store.token_of("u2"), None);
    assert_eq!(store.token_of("u4"), Some("T4".to_string()));

    // The wrong-category and ineligible users never saw a send attempt
    let sent = channel.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert!(!sent.contains(&"T4".to_string()));
}

#[tokio::test]
async fn test_dispatch_is_order_independent() {
    let preferences = vec![
        rental_pref("u1", Some("T1")),
        rental_pref("u2", Some("DEAD")),
        rental_pref("u3", Some("T3")),
        rental_pref("u4", None),
    ];

    let channel = Arc::new(FakeChannel::new(&["DEAD"]));
    let dispatcher = Dispatcher::new(channel, Duration::from_secs(5));
    let listing = rental_listing();

    let forward: HashSet<DeliveryResult> = dispatcher
        .dispatch(&listing, &preferences)
        .await
        .into_iter()
        .collect();

    let mut shuffled = preferences.clone();
    shuffled.reverse();
    shuffled.swap(0, 1);

    let reordered: HashSet<DeliveryResult> = dispatcher
        .dispatch(&listing, &shuffled)
        .await
        .into_iter()
        .collect();

    assert_eq!(forward, reordered);
}

#[tokio::test]
async fn test_cleanup_twice_leaves_store_unchanged() {
    let store = Arc::new(MemoryStore::new(vec![
        rental_pref("u1", Some("DEAD")),
        rental_pref("u2", Some("T2")),
    ]));
    let cleanup = SubscriptionCleanup::new(store.clone());

    let results = vec![
        DeliveryResult::failed("u1", DeliveryFailure::InvalidToken),
        DeliveryResult::ok("u2"),
    ];

    cleanup.run(&results).await;
    let first_pass: Vec<Preference> = store.preferences.lock().unwrap().clone();

    cleanup.run(&results).await;
    let second_pass: Vec<Preference> = store.preferences.lock().unwrap().clone();

    assert_eq!(first_pass, second_pass);
    assert_eq!(store.token_of("u1"), None);
    assert_eq!(store.token_of("u2"), Some("T2".to_string()));
}

#[tokio::test]
async fn test_timeout_failure_never_clears_token() {
    /// Channel that never answers within the dispatcher's timeout
    struct StalledChannel;

    #[async_trait]
    impl DeliveryChannel for StalledChannel {
        async fn send(&self, _token: &str, _payload: &NotificationPayload) -> Result<(), PushError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    let store = Arc::new(MemoryStore::new(vec![rental_pref("u1", Some("T3"))]));
    let dispatcher = Dispatcher::new(Arc::new(StalledChannel), Duration::from_millis(20));
    let cleanup = SubscriptionCleanup::new(store.clone());

    let loaded = store.list_preferences().await.unwrap();
    let results = dispatcher.dispatch(&rental_listing(), &loaded).await;

    assert_eq!(
        results,
        vec![DeliveryResult::failed("u1", DeliveryFailure::Timeout)]
    );

    let cleared = cleanup.run(&results).await;
    assert_eq!(cleared, 0);
    assert_eq!(store.token_of("u1"), Some("T3".to_string()));
}
