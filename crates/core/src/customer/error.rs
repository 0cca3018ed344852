//! Customer error types.

use routebill_shared::AppError;
use thiserror::Error;

/// Customer validation and policy errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    /// Blank name.
    #[error("Customer name is required.")]
    NameRequired,

    /// Blank email.
    #[error("Email is required.")]
    EmailRequired,

    /// Customer still has non-void invoices.
    #[error("Cannot set inactive: customer has {0} open invoice(s). Void or settle them first.")]
    HasInvoices(u64),
}

impl From<CustomerError> for AppError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::HasInvoices(_) => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
