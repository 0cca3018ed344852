//! Report rows and period summary types.

use chrono::NaiveDate;
use routebill_shared::types::{CustomerId, DateRange, InvoiceId, SubscriptionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of the `accounts_receivable` view: one non-void invoice with its
/// paid and outstanding amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivableRow {
    /// Invoice ID.
    pub invoice_id: InvoiceId,
    /// Invoice number.
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Billed customer.
    pub customer_id: CustomerId,
    /// Customer name.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Source subscription.
    #[serde(default)]
    pub subscription_id: Option<SubscriptionId>,
    /// First day of the billed period.
    pub period_start: NaiveDate,
    /// Last day of the billed period.
    pub period_end: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Sum of allocations.
    #[serde(default)]
    pub paid_amount: Decimal,
    /// Amount still owed.
    pub balance_amount: Decimal,
}

/// A row of the `invoices_to_email` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSendRow {
    /// Invoice waiting to be emailed.
    pub invoice_id: InvoiceId,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Amount still owed.
    pub balance_amount: Decimal,
    /// First day of the billed period.
    #[serde(default)]
    pub period_start: Option<NaiveDate>,
}

/// Granularity of the trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketMode {
    /// Monday-start weeks, keyed `YYYY-MM-DD` by their Monday.
    Week,
    /// Calendar months, keyed `YYYY-MM`.
    Month,
}

/// One point of the trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    /// `YYYY-MM-DD` (week) or `YYYY-MM` (month).
    pub key: String,
    /// First day of the bucket, used for ordering.
    pub start: NaiveDate,
    /// Totals of non-void invoices starting in the bucket.
    pub issued: Decimal,
    /// Totals of paid invoices starting in the bucket.
    pub paid: Decimal,
    /// Receivable balances starting in the bucket.
    pub due: Decimal,
}

impl TrendBucket {
    pub(crate) fn empty(key: String, start: NaiveDate) -> Self {
        Self {
            key,
            start,
            issued: Decimal::ZERO,
            paid: Decimal::ZERO,
            due: Decimal::ZERO,
        }
    }
}

/// Billing totals for a date range.
///
/// `paid_total` is attributed to the invoice's period, not to the date the
/// money arrived. It is `total - outstanding` per invoice, so a payment made
/// in July against a June invoice counts as June.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// The summarised range.
    pub range: DateRange,
    /// Non-void invoice totals with period_start in range.
    pub invoiced_total: Decimal,
    /// Settled part of those invoices.
    pub paid_total: Decimal,
    /// Receivable balances with period_start in range.
    pub due_total: Decimal,
    /// Balances of invoices waiting to be emailed.
    pub pending_total: Decimal,
    /// Invoices waiting to be emailed.
    pub pending_count: usize,
    /// Trend granularity.
    pub bucket_mode: BucketMode,
    /// Trend series, oldest first.
    pub buckets: Vec<TrendBucket>,
}

impl PeriodSummary {
    /// `paid / invoiced` as a percentage clamped to `[0, 100]`; zero when
    /// nothing was invoiced.
    #[must_use]
    pub fn collection_percent(&self) -> Decimal {
        if self.invoiced_total <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.paid_total / self.invoiced_total * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }
}
