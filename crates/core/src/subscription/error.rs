//! Subscription error types.

use routebill_shared::AppError;
use thiserror::Error;

/// Subscription validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// No customer selected.
    #[error("Pick a customer.")]
    CustomerRequired,

    /// No route selected.
    #[error("Pick a route.")]
    RouteRequired,

    /// No billing period selected.
    #[error("Pick a billing period.")]
    BillingPeriodRequired,

    /// No start date given.
    #[error("Start date is required.")]
    StartDateRequired,

    /// Seats below one.
    #[error("Seats must be at least 1.")]
    SeatsBelowOne,

    /// Override below zero.
    #[error("Price override cannot be negative.")]
    NegativeOverride,
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        Self::Validation(err.to_string())
    }
}
