//! Read-only reporting views.

use std::sync::Arc;

use routebill_core::customer::CustomerCredit;
use routebill_core::reports::{PendingSendRow, ReceivableRow};
use routebill_shared::types::{CustomerId, DateRange, SubscriptionId};
use rust_decimal::Decimal;

use super::fetch;
use crate::client::{DataClient, Query};
use crate::error::DataError;

const RECEIVABLES: &str = "accounts_receivable";
const PENDING_SENDS: &str = "invoices_to_email";
const CREDIT: &str = "customer_credit";

/// Repository for `accounts_receivable`, `invoices_to_email` and
/// `customer_credit`.
#[derive(Clone)]
pub struct ViewRepository {
    client: Arc<dyn DataClient>,
}

impl ViewRepository {
    /// Creates a new view repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Receivables by descending balance, optionally limited to periods
    /// starting inside `range`.
    pub async fn receivables(
        &self,
        range: Option<DateRange>,
        limit: usize,
    ) -> Result<Vec<ReceivableRow>, DataError> {
        let mut query = Query::table(RECEIVABLES)
            .order("balance_amount", false)
            .limit(limit);
        if let Some(range) = range {
            query = query
                .gte("period_start", range.from())
                .lte("period_start", range.to());
        }
        fetch(self.client.as_ref(), &query).await
    }

    /// Receivables of one customer.
    pub async fn receivables_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<ReceivableRow>, DataError> {
        let query = Query::table(RECEIVABLES).eq("customer_id", customer_id);
        fetch(self.client.as_ref(), &query).await
    }

    /// Receivables raised for any of the given subscriptions.
    pub async fn receivables_for_subscriptions(
        &self,
        ids: &[SubscriptionId],
    ) -> Result<Vec<ReceivableRow>, DataError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::table(RECEIVABLES).in_list("subscription_id", ids.iter().copied());
        fetch(self.client.as_ref(), &query).await
    }

    /// Invoices still waiting to be emailed.
    pub async fn pending_sends(
        &self,
        range: Option<DateRange>,
        limit: usize,
    ) -> Result<Vec<PendingSendRow>, DataError> {
        let mut query = Query::table(PENDING_SENDS)
            .order("period_start", false)
            .limit(limit);
        if let Some(range) = range {
            query = query
                .gte("period_start", range.from())
                .lte("period_start", range.to());
        }
        fetch(self.client.as_ref(), &query).await
    }

    /// Credit held by one customer, if any.
    pub async fn credit_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<CustomerCredit>, DataError> {
        let query = Query::table(CREDIT).eq("customer_id", customer_id).limit(1);
        Ok(fetch(self.client.as_ref(), &query).await?.into_iter().next())
    }

    /// Customers holding credit, largest first.
    pub async fn customer_credit(&self, limit: usize) -> Result<Vec<CustomerCredit>, DataError> {
        let query = Query::table(CREDIT)
            .gt("credit_balance", Decimal::ZERO)
            .order("credit_balance", false)
            .limit(limit);
        fetch(self.client.as_ref(), &query).await
    }
}
