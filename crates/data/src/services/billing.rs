//! Billing screen: invoices in a range with KPIs and invoice actions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use routebill_core::invoice::{
    Invoice, InvoiceDraft, InvoiceError, InvoiceService, InvoiceStatus, InvoiceStatusFilter, LineDraft,
    StatusTone,
};
use routebill_core::reports::{PeriodSummary, ReportService};
use routebill_shared::types::{DateRange, InvoiceId, InvoiceLineId};
use routebill_shared::{AppResult, BillingConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::Store;
use super::state::LoadGate;
use crate::client::DataClient;
use crate::procedures::{InvoiceRunMode, InvoiceRunResult};

/// What the billing list is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingParams {
    /// Invoices whose period starts in this window.
    pub range: DateRange,
    /// Status filter.
    pub status: InvoiceStatusFilter,
    /// Free text over number, customer name and email.
    pub search: Option<String>,
}

impl BillingParams {
    /// All invoices in `range`.
    #[must_use]
    pub fn for_range(range: DateRange) -> Self {
        Self {
            range,
            status: InvoiceStatusFilter::All,
            search: None,
        }
    }
}

/// One invoice in the billing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingRow {
    /// The invoice.
    pub invoice: Invoice,
    /// Invoice number, or a short ID when unassigned.
    pub display_number: String,
    /// Customer display name.
    pub customer_name: Option<String>,
    /// Customer email.
    pub customer_email: Option<String>,
    /// Receivable balance; zero when the invoice has no receivable row.
    pub outstanding: Decimal,
    /// Status badge text.
    pub label: String,
    /// Status badge colour.
    pub tone: StatusTone,
}

/// Billing headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BillingKpis {
    /// Invoiced in range.
    pub invoiced: Decimal,
    /// Paid against those invoices.
    pub paid: Decimal,
    /// Outstanding in range.
    pub due: Decimal,
    /// Awaiting email in range.
    pub pending: Decimal,
}

impl From<&PeriodSummary> for BillingKpis {
    fn from(summary: &PeriodSummary) -> Self {
        Self {
            invoiced: summary.invoiced_total,
            paid: summary.paid_total,
            due: summary.due_total,
            pending: summary.pending_total,
        }
    }
}

/// The billing screen's data.
#[derive(Debug, Clone, Serialize)]
pub struct BillingSnapshot {
    /// Filtered invoice rows, latest period first.
    pub rows: Vec<BillingRow>,
    /// Headline figures.
    pub kpis: BillingKpis,
    /// Full aggregation, including the trend.
    pub summary: PeriodSummary,
}

/// Loads the billing screen and runs invoice actions.
#[derive(Clone)]
pub struct BillingScreen {
    store: Store,
    config: BillingConfig,
    gate: Arc<LoadGate>,
}

impl BillingScreen {
    /// Creates the screen service.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>, config: BillingConfig) -> Self {
        Self {
            store: Store::new(&client),
            config,
            gate: Arc::new(LoadGate::new()),
        }
    }

    /// Loads through the screen's gate so that only the latest refresh lands.
    ///
    /// Returns `None` when a newer refresh superseded this one.
    pub async fn refresh(&self, params: &BillingParams) -> Option<AppResult<BillingSnapshot>> {
        self.gate.run(self.load(params)).await
    }

    /// Loads invoices, receivables and pending sends for `params`.
    #[instrument(skip(self), fields(from = %params.range.from(), to = %params.range.to()))]
    pub async fn load(&self, params: &BillingParams) -> AppResult<BillingSnapshot> {
        let limit = self.config.list_limit;
        let range = params.range;
        let store = &self.store;

        let (invoices, receivables, pending) = tokio::try_join!(
            store
                .invoices
                .in_range(range, params.status.backend_status(), limit),
            store.views.receivables(Some(range), limit),
            store.views.pending_sends(Some(range), limit),
        )?;

        let mut customer_ids: Vec<_> = invoices.iter().map(|i| i.customer_id).collect();
        customer_ids.sort_unstable();
        customer_ids.dedup();
        let customers: HashMap<_, _> = store
            .customers
            .by_ids(&customer_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let summary = ReportService::aggregate(
            &invoices,
            &receivables,
            &pending,
            range,
            self.config.bucket_threshold_days,
        );

        let balances: HashMap<_, _> = receivables
            .iter()
            .map(|r| (r.invoice_id, r.balance_amount))
            .collect();
        let needle = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let rows = invoices
            .into_iter()
            .map(|invoice| {
                let outstanding = balances.get(&invoice.id).copied().unwrap_or_default();
                let customer = customers.get(&invoice.customer_id);
                BillingRow {
                    display_number: invoice.display_number(),
                    customer_name: customer.map(|c| c.display_name.clone()),
                    customer_email: customer.and_then(|c| c.email.clone()),
                    label: invoice.status.label(outstanding),
                    tone: invoice.status.tone(outstanding),
                    outstanding,
                    invoice,
                }
            })
            .filter(|row| params.status.matches(row.invoice.status, row.outstanding))
            .filter(|row| needle.as_deref().is_none_or(|n| row_matches(row, n)))
            .collect();

        Ok(BillingSnapshot {
            rows,
            kpis: BillingKpis::from(&summary),
            summary,
        })
    }

    /// Creates an invoice, taking a number from the backend when none was
    /// entered, and reloads.
    pub async fn create_invoice(
        &self,
        draft: &InvoiceDraft,
        params: &BillingParams,
    ) -> AppResult<(Invoice, BillingSnapshot)> {
        let invoice = self
            .store
            .create_invoice(draft, self.config.currency())
            .await?;
        Ok((invoice, self.load(params).await?))
    }

    /// Adds a line to an invoice and reloads.
    pub async fn add_line(
        &self,
        invoice_id: InvoiceId,
        draft: &LineDraft,
        params: &BillingParams,
    ) -> AppResult<BillingSnapshot> {
        let invoice = self.store.invoices.get(invoice_id).await?;
        if invoice.status.is_void() {
            return Err(InvoiceError::InvoiceVoid.into());
        }
        let line = InvoiceService::validate_line(
            invoice.id,
            draft,
            invoice.total_amount,
            self.config.currency(),
        )?;
        self.store.invoices.insert_line(&line).await?;
        info!(%invoice_id, "Invoice line added");
        self.load(params).await
    }

    /// Deletes an invoice line and reloads.
    pub async fn delete_line(
        &self,
        line_id: InvoiceLineId,
        params: &BillingParams,
    ) -> AppResult<BillingSnapshot> {
        self.store.invoices.delete_line(line_id).await?;
        info!(%line_id, "Invoice line deleted");
        self.load(params).await
    }

    /// Manually corrects an invoice's status and reloads.
    ///
    /// Transitions outside the usual lifecycle are allowed but logged. The
    /// write only applies if the invoice is unchanged since `seen` was read.
    pub async fn set_status(
        &self,
        seen: &Invoice,
        status: InvoiceStatus,
        params: &BillingParams,
    ) -> AppResult<BillingSnapshot> {
        if !seen.status.is_expected_transition(status) {
            warn!(
                invoice_id = %seen.id,
                from = %seen.status,
                to = %status,
                "Unexpected invoice status transition"
            );
        }
        self.store
            .invoices
            .set_status(seen.id, status, seen.updated_at)
            .await?;
        info!(invoice_id = %seen.id, %status, "Invoice status set");
        self.load(params).await
    }

    /// Raises invoices for every subscription due on `run_date` and reloads.
    pub async fn run_invoices(
        &self,
        run_date: NaiveDate,
        mode: InvoiceRunMode,
        params: &BillingParams,
    ) -> AppResult<(InvoiceRunResult, BillingSnapshot)> {
        let result = self
            .store
            .procedures
            .generate_due_invoices(run_date, mode)
            .await?;
        Ok((result, self.load(params).await?))
    }
}

fn row_matches(row: &BillingRow, needle: &str) -> bool {
    [
        Some(row.display_number.as_str()),
        row.customer_name.as_deref(),
        row.customer_email.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
