//! Invoice, line and payment data types.

use chrono::{DateTime, NaiveDate, Utc};
use routebill_shared::types::{
    AllocationId, CustomerId, InvoiceId, InvoiceLineId, PaymentId, SubscriptionId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::status::InvoiceStatus;

/// An invoice as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    #[serde(rename = "invoice_id")]
    pub id: InvoiceId,
    /// Assigned number; absent until the backend assigns one.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Source subscription; absent for manual invoices.
    #[serde(default)]
    pub subscription_id: Option<SubscriptionId>,
    /// First day of the billed period.
    pub period_start: NaiveDate,
    /// Last day of the billed period.
    pub period_end: NaiveDate,
    /// Sum of line totals, maintained by the backend.
    pub total_amount: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
    /// Delivery state of the invoice email.
    #[serde(default)]
    pub email_status: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Row version used for conditional updates.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// The invoice number, or `#` and the first eight ID digits.
    #[must_use]
    pub fn display_number(&self) -> String {
        match self.invoice_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => format!("#{}", self.id.short()),
        }
    }
}

/// One invoice line. `line_total` is computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Line ID.
    #[serde(rename = "invoice_line_id")]
    pub id: InvoiceLineId,
    /// Owning invoice.
    pub invoice_id: InvoiceId,
    /// Description.
    pub description: String,
    /// Quantity.
    pub qty: Decimal,
    /// Unit price; negative for credits.
    pub unit_price: Decimal,
    /// Backend-computed total.
    #[serde(default)]
    pub line_total: Option<Decimal>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Line form state before validation.
#[derive(Debug, Clone, Default)]
pub struct LineDraft {
    /// Description; trimmed, must not be blank.
    pub description: String,
    /// Quantity; must be above zero.
    pub qty: Decimal,
    /// Unit price; may be negative.
    pub unit_price: Decimal,
}

/// Validated line insert. The backend fills `line_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInvoiceLine {
    /// Owning invoice.
    pub invoice_id: InvoiceId,
    /// Trimmed description.
    pub description: String,
    /// Quantity.
    pub qty: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
}

/// Invoice form state before validation.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDraft {
    /// Billed customer.
    pub customer_id: Option<CustomerId>,
    /// Source subscription.
    pub subscription_id: Option<SubscriptionId>,
    /// Number typed by the operator; blank asks the backend for one.
    pub invoice_number: Option<String>,
    /// First day of the billed period.
    pub period_start: Option<NaiveDate>,
    /// Last day of the billed period.
    pub period_end: Option<NaiveDate>,
    /// Line added right after the invoice is created.
    pub initial_line: Option<LineDraft>,
}

/// Validated invoice insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewInvoice {
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Source subscription.
    pub subscription_id: Option<SubscriptionId>,
    /// Invoice number.
    pub invoice_number: Option<String>,
    /// First day of the billed period.
    pub period_start: NaiveDate,
    /// Last day of the billed period.
    pub period_end: NaiveDate,
    /// Initial status; always issued.
    pub status: InvoiceStatus,
}

/// A received payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    #[serde(rename = "payment_id")]
    pub id: PaymentId,
    /// Paying customer.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Payment provider (e.g. `eft`, `payfast`).
    #[serde(default)]
    pub provider: Option<String>,
    /// Provider reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Amount received.
    pub amount: Decimal,
    /// When the payment was received.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Part of a payment applied to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    /// Allocation ID.
    #[serde(rename = "allocation_id")]
    pub id: AllocationId,
    /// Source payment.
    pub payment_id: PaymentId,
    /// Target invoice.
    pub invoice_id: InvoiceId,
    /// Amount applied.
    pub allocated_amount: Decimal,
}

/// Payment insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPayment {
    /// Paying customer.
    pub customer_id: CustomerId,
    /// Payment provider.
    pub provider: String,
    /// Provider reference.
    pub reference: Option<String>,
    /// Amount received.
    pub amount: Decimal,
    /// When the payment was received.
    pub paid_at: DateTime<Utc>,
}

/// Allocation insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAllocation {
    /// Source payment.
    pub payment_id: PaymentId,
    /// Target invoice.
    pub invoice_id: InvoiceId,
    /// Amount applied.
    pub allocated_amount: Decimal,
}

/// Status filter on the billing list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatusFilter {
    /// Every invoice.
    #[default]
    All,
    /// Issued invoices.
    Issued,
    /// Paid invoices.
    Paid,
    /// Any invoice with more than a cent outstanding.
    Due,
    /// Partially paid invoices.
    PartiallyPaid,
    /// Overdue invoices.
    Overdue,
}

impl InvoiceStatusFilter {
    /// Returns true if an invoice with this status and balance passes the filter.
    #[must_use]
    pub fn matches(self, status: InvoiceStatus, outstanding: Decimal) -> bool {
        match self {
            Self::All => true,
            Self::Issued => status == InvoiceStatus::Issued,
            Self::Paid => status == InvoiceStatus::Paid,
            Self::PartiallyPaid => status == InvoiceStatus::PartiallyPaid,
            Self::Overdue => status == InvoiceStatus::Overdue,
            Self::Due => outstanding > super::status::OUTSTANDING_EPSILON,
        }
    }

    /// The status the backend query can filter on, if any.
    #[must_use]
    pub const fn backend_status(self) -> Option<InvoiceStatus> {
        match self {
            Self::Issued => Some(InvoiceStatus::Issued),
            Self::Paid => Some(InvoiceStatus::Paid),
            Self::PartiallyPaid => Some(InvoiceStatus::PartiallyPaid),
            Self::Overdue => Some(InvoiceStatus::Overdue),
            Self::All | Self::Due => None,
        }
    }
}

impl std::str::FromStr for InvoiceStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "issued" => Ok(Self::Issued),
            "paid" => Ok(Self::Paid),
            "due" => Ok(Self::Due),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(format!("Unknown status filter: {s}")),
        }
    }
}
