//! Invoice error types.

use routebill_shared::types::Money;
use routebill_shared::AppError;
use thiserror::Error;

/// Invoice, line and payment validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    /// No customer selected for a new invoice.
    #[error("Pick a customer.")]
    CustomerRequired,

    /// Period dates missing.
    #[error("Invoice period is required.")]
    PeriodRequired,

    /// Period ends before it starts.
    #[error("Period end cannot be before period start.")]
    PeriodInverted,

    /// Blank line description.
    #[error("Description is required.")]
    DescriptionRequired,

    /// Quantity zero or negative.
    #[error("Qty must be > 0.")]
    QtyNotPositive,

    /// A credit line would push the invoice total below zero.
    #[error("Credit too large. Invoice total cannot go below zero (would be {would_be}).")]
    CreditTooLarge {
        /// Total after the line.
        would_be: Money,
    },

    /// Payment or allocation amount zero or negative.
    #[error("Amount must be greater than zero.")]
    AmountNotPositive,

    /// Allocation exceeds the invoice balance.
    #[error("Allocation of {amount} exceeds the outstanding balance of {outstanding}.")]
    ExceedsBalance {
        /// Requested allocation.
        amount: Money,
        /// Current balance.
        outstanding: Money,
    },

    /// Void invoices accept no changes.
    #[error("Invoice is void.")]
    InvoiceVoid,
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::InvoiceVoid | InvoiceError::ExceedsBalance { .. } => {
                Self::BusinessRule(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}
