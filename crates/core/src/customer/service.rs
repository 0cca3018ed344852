//! Customer validation and policy guards.

use super::error::CustomerError;
use super::types::{CustomerDraft, NewCustomer};

/// Service for customer business logic.
pub struct CustomerService;

impl CustomerService {
    /// Validates a customer form and builds the insert.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NameRequired` or `CustomerError::EmailRequired`
    /// when the trimmed value is blank.
    pub fn validate_customer(draft: &CustomerDraft) -> Result<NewCustomer, CustomerError> {
        let display_name = draft.display_name.trim();
        if display_name.is_empty() {
            return Err(CustomerError::NameRequired);
        }

        let email = draft.email.trim();
        if email.is_empty() {
            return Err(CustomerError::EmailRequired);
        }

        Ok(NewCustomer {
            customer_type: draft.customer_type,
            display_name: display_name.to_string(),
            email: email.to_string(),
            phone: non_blank(&draft.phone),
            status: draft.status,
            notes: non_blank(&draft.notes),
        })
    }

    /// Refuses inactivation while non-void invoices exist.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::HasInvoices` if `open_invoice_count` is non-zero.
    pub fn check_inactivation(open_invoice_count: u64) -> Result<(), CustomerError> {
        if open_invoice_count > 0 {
            return Err(CustomerError::HasInvoices(open_invoice_count));
        }
        Ok(())
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
