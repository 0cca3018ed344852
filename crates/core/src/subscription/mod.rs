//! Subscriptions and the expected-value estimator.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::SubscriptionError;
pub use service::SubscriptionService;
pub use types::{
    ExpectedRevenue, NewSubscription, OverridePolicy, Subscription, SubscriptionDraft,
    SubscriptionFilter, SubscriptionStatus,
};
