//! Customer data types.

use chrono::{DateTime, Utc};
use routebill_shared::types::CustomerId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// A person.
    #[default]
    Individual,
    /// A company.
    Business,
}

/// Customer status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    /// Can be billed.
    #[default]
    Active,
    /// Archived.
    Inactive,
}

impl CustomerStatus {
    /// Returns the string representation used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID.
    #[serde(rename = "customer_id")]
    pub id: CustomerId,
    /// Name shown everywhere.
    pub display_name: String,
    /// Billing email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Individual or business.
    #[serde(default)]
    pub customer_type: CustomerType,
    /// Active or inactive.
    pub status: CustomerStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Returns true if the customer is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }
}

/// Customer form state before validation.
#[derive(Debug, Clone, Default)]
pub struct CustomerDraft {
    /// Individual or business.
    pub customer_type: CustomerType,
    /// Required.
    pub display_name: String,
    /// Required.
    pub email: String,
    /// Blank becomes absent.
    pub phone: String,
    /// Initial status.
    pub status: CustomerStatus,
    /// Blank becomes absent.
    pub notes: String,
}

/// Validated customer insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    /// Individual or business.
    pub customer_type: CustomerType,
    /// Trimmed name.
    pub display_name: String,
    /// Trimmed email.
    pub email: String,
    /// Trimmed phone.
    pub phone: Option<String>,
    /// Initial status.
    pub status: CustomerStatus,
    /// Trimmed notes.
    pub notes: Option<String>,
}

/// Customer list filter.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Only this status; `None` shows all.
    pub status: Option<CustomerStatus>,
    /// Case-insensitive match on name, email or phone.
    pub search: Option<String>,
}

impl CustomerFilter {
    /// Returns true if the customer passes the filter.
    #[must_use]
    pub fn matches(&self, customer: &Customer) -> bool {
        if self.status.is_some_and(|s| s != customer.status) {
            return false;
        }
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            Some(customer.display_name.as_str()),
            customer.email.as_deref(),
            customer.phone.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Headline counts for the customer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CustomerCounts {
    /// All customers.
    pub total: usize,
    /// Active customers.
    pub active: usize,
    /// Inactive customers.
    pub inactive: usize,
}

impl CustomerCounts {
    /// Counts customers by status.
    #[must_use]
    pub fn tally(customers: &[Customer]) -> Self {
        customers.iter().fold(Self::default(), |mut counts, c| {
            counts.total += 1;
            match c.status {
                CustomerStatus::Active => counts.active += 1,
                CustomerStatus::Inactive => counts.inactive += 1,
            }
            counts
        })
    }
}

/// A row of the `customer_credit` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCredit {
    /// Customer with unallocated money.
    pub customer_id: CustomerId,
    /// Customer name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
    /// Payments not yet allocated to invoices.
    pub credit_balance: Decimal,
}

impl CustomerCredit {
    /// Sum of positive credit balances.
    #[must_use]
    pub fn total(rows: &[Self]) -> Decimal {
        rows.iter()
            .map(|r| r.credit_balance)
            .filter(|b| *b > Decimal::ZERO)
            .sum()
    }
}
