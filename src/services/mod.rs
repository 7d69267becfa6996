// Service exports
pub mod push;
pub mod store;

pub use push::{DeliveryChannel, FcmClient, PushError};
pub use store::{AppwriteStore, PreferenceStore, StoreError};
