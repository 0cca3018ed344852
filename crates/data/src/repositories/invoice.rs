//! Invoice and invoice line repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use routebill_core::invoice::{
    Invoice, InvoiceLine, InvoiceStatus, NewInvoice, NewInvoiceLine,
};
use routebill_shared::types::{CustomerId, DateRange, InvoiceId, InvoiceLineId, SubscriptionId};
use serde_json::json;

use super::{fetch, fetch_one, insert, update};
use crate::client::{DataClient, Filter, Query};
use crate::error::DataError;

const TABLE: &str = "invoices";
const LINES: &str = "invoice_lines";

/// Repository for the `invoices` and `invoice_lines` tables.
#[derive(Clone)]
pub struct InvoiceRepository {
    client: Arc<dyn DataClient>,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Non-void invoices whose period starts inside `range`.
    pub async fn in_range(
        &self,
        range: DateRange,
        status: Option<InvoiceStatus>,
        limit: usize,
    ) -> Result<Vec<Invoice>, DataError> {
        let mut query = Query::table(TABLE)
            .gte("period_start", range.from())
            .lte("period_start", range.to())
            .neq("status", InvoiceStatus::Void)
            .order("period_start", false)
            .limit(limit);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        fetch(self.client.as_ref(), &query).await
    }

    /// Loads one invoice.
    pub async fn get(&self, id: InvoiceId) -> Result<Invoice, DataError> {
        fetch_one(
            self.client.as_ref(),
            Query::table(TABLE).eq("invoice_id", id),
            "Invoice",
        )
        .await
    }

    /// Non-void invoices of one customer, latest period first.
    pub async fn for_customer(&self, customer_id: CustomerId) -> Result<Vec<Invoice>, DataError> {
        let query = Query::table(TABLE)
            .eq("customer_id", customer_id)
            .neq("status", InvoiceStatus::Void)
            .order("period_start", false);
        fetch(self.client.as_ref(), &query).await
    }

    /// Invoices raised for any of the given subscriptions.
    pub async fn for_subscriptions(
        &self,
        ids: &[SubscriptionId],
    ) -> Result<Vec<Invoice>, DataError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::table(TABLE)
            .in_list("subscription_id", ids.iter().copied())
            .order("period_start", false);
        fetch(self.client.as_ref(), &query).await
    }

    /// Every non-void invoice.
    pub async fn non_void(&self, limit: usize) -> Result<Vec<Invoice>, DataError> {
        let query = Query::table(TABLE)
            .neq("status", InvoiceStatus::Void)
            .limit(limit);
        fetch(self.client.as_ref(), &query).await
    }

    /// Counts a customer's non-void invoices.
    pub async fn count_open_for_customer(&self, customer_id: CustomerId) -> Result<u64, DataError> {
        self.client
            .count(
                &Query::table(TABLE)
                    .select("invoice_id")
                    .eq("customer_id", customer_id)
                    .neq("status", InvoiceStatus::Void),
            )
            .await
    }

    /// Inserts an invoice header.
    pub async fn insert(&self, invoice: &NewInvoice) -> Result<Invoice, DataError> {
        insert(self.client.as_ref(), TABLE, invoice).await
    }

    /// Sets an invoice's status.
    ///
    /// With `expected_updated_at`, the write only applies if the row has not
    /// changed since it was read.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::StaleWrite`] when the row changed underneath, or
    /// [`DataError::NotFound`] when it no longer exists.
    pub async fn set_status(
        &self,
        id: InvoiceId,
        status: InvoiceStatus,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Invoice, DataError> {
        update(
            self.client.as_ref(),
            TABLE,
            vec![Filter::eq("invoice_id", id)],
            &json!({ "status": status }),
            expected_updated_at,
            "Invoice",
        )
        .await
    }

    /// Lines of one invoice in entry order.
    pub async fn lines(&self, invoice_id: InvoiceId) -> Result<Vec<InvoiceLine>, DataError> {
        let query = Query::table(LINES)
            .eq("invoice_id", invoice_id)
            .order("created_at", true);
        fetch(self.client.as_ref(), &query).await
    }

    /// Inserts a line. The backend recomputes the line and invoice totals.
    pub async fn insert_line(&self, line: &NewInvoiceLine) -> Result<InvoiceLine, DataError> {
        insert(self.client.as_ref(), LINES, line).await
    }

    /// Deletes a line.
    pub async fn delete_line(&self, id: InvoiceLineId) -> Result<(), DataError> {
        let removed = self
            .client
            .delete(LINES, &[Filter::eq("invoice_line_id", id)])
            .await?;
        if removed == 0 {
            return Err(DataError::NotFound("Invoice line".to_string()));
        }
        Ok(())
    }
}
