//! Pricing error types.

use routebill_shared::AppError;
use thiserror::Error;

/// Pricing validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// A weekly or monthly price is below zero.
    #[error("Prices cannot be negative.")]
    NegativePrice,

    /// The interval ends before it starts.
    #[error("effective_to cannot be before effective_from.")]
    EffectiveToBeforeFrom,
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        Self::Validation(err.to_string())
    }
}
