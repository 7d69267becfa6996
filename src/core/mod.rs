// Core algorithm exports
pub mod cleanup;
pub mod dispatcher;
pub mod filters;

pub use cleanup::SubscriptionCleanup;
pub use dispatcher::Dispatcher;
pub use filters::matches_listing;
