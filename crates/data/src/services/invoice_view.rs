//! Single invoice: lines, allocations and payments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use routebill_core::customer::Customer;
use routebill_core::invoice::{
    Invoice, InvoiceError, InvoiceLine, InvoiceService, LineDraft, NewAllocation, NewPayment,
    PaymentAllocation, StatusTone,
};
use routebill_core::route::Route;
use routebill_core::subscription::Subscription;
use routebill_shared::types::{InvoiceId, InvoiceLineId};
use routebill_shared::{AppResult, BillingConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::Store;
use crate::client::DataClient;
use crate::error::DataError;

/// A payment entered against one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDraft {
    /// Amount received and allocated to the invoice.
    pub amount: Decimal,
    /// Payment provider, e.g. `eft` or `cash`.
    pub provider: String,
    /// Provider reference.
    pub reference: Option<String>,
    /// When the money arrived.
    pub paid_at: DateTime<Utc>,
}

/// The invoice view's data.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceSnapshot {
    /// The invoice header.
    pub invoice: Invoice,
    /// Invoice number, or a short ID when unassigned.
    pub display_number: String,
    /// Billed customer.
    pub customer: Customer,
    /// Originating subscription, if any.
    pub subscription: Option<Subscription>,
    /// The subscription's route.
    pub route: Option<Route>,
    /// Lines in entry order.
    pub lines: Vec<InvoiceLine>,
    /// Payment allocations against the invoice.
    pub allocations: Vec<PaymentAllocation>,
    /// Sum of allocations.
    pub paid: Decimal,
    /// Remaining balance, zero for void invoices.
    pub balance: Decimal,
    /// Status badge text.
    pub label: String,
    /// Status badge colour.
    pub tone: StatusTone,
}

/// Loads one invoice and runs line and payment actions on it.
#[derive(Clone)]
pub struct InvoiceScreen {
    store: Store,
    config: BillingConfig,
}

impl InvoiceScreen {
    /// Creates the screen service.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>, config: BillingConfig) -> Self {
        Self {
            store: Store::new(&client),
            config,
        }
    }

    /// Loads an invoice with everything around it.
    #[instrument(skip(self))]
    pub async fn load(&self, invoice_id: InvoiceId) -> AppResult<InvoiceSnapshot> {
        let store = &self.store;
        let invoice = store.invoices.get(invoice_id).await?;

        let subscription = async {
            match invoice.subscription_id {
                Some(id) => store.subscriptions.get(id).await.map(Some),
                None => Ok::<_, DataError>(None),
            }
        };
        let (customer, lines, allocations, subscription) = tokio::try_join!(
            store.customers.get(invoice.customer_id),
            store.invoices.lines(invoice_id),
            store.payments.allocations_for_invoice(invoice_id),
            subscription,
        )?;

        let route = match &subscription {
            Some(sub) => Some(store.routes.get(sub.route_id).await?),
            None => None,
        };

        let paid = InvoiceService::paid_amount(invoice.id, &allocations);
        let balance = InvoiceService::invoice_balance(&invoice, &allocations);
        debug!(lines = lines.len(), %paid, %balance, "Invoice loaded");

        Ok(InvoiceSnapshot {
            display_number: invoice.display_number(),
            label: invoice.status.label(balance),
            tone: invoice.status.tone(balance),
            invoice,
            customer,
            subscription,
            route,
            lines,
            allocations,
            paid,
            balance,
        })
    }

    /// Adds a line, refusing credits that would take the total below zero.
    pub async fn add_line(
        &self,
        invoice_id: InvoiceId,
        draft: &LineDraft,
    ) -> AppResult<InvoiceSnapshot> {
        let invoice = self.store.invoices.get(invoice_id).await?;
        if invoice.status.is_void() {
            return Err(InvoiceError::InvoiceVoid.into());
        }
        let line = InvoiceService::validate_line(
            invoice_id,
            draft,
            invoice.total_amount,
            self.config.currency(),
        )?;
        self.store.invoices.insert_line(&line).await?;
        info!(%invoice_id, qty = %line.qty, unit_price = %line.unit_price, "Invoice line added");
        self.load(invoice_id).await
    }

    /// Deletes a line.
    pub async fn delete_line(
        &self,
        invoice_id: InvoiceId,
        line_id: InvoiceLineId,
    ) -> AppResult<InvoiceSnapshot> {
        self.store.invoices.delete_line(line_id).await?;
        info!(%invoice_id, %line_id, "Invoice line deleted");
        self.load(invoice_id).await
    }

    /// Records a payment and allocates it to the invoice.
    ///
    /// The allocation may not exceed the current balance.
    pub async fn record_payment(
        &self,
        invoice_id: InvoiceId,
        draft: &PaymentDraft,
    ) -> AppResult<InvoiceSnapshot> {
        let (invoice, allocations) = tokio::try_join!(
            self.store.invoices.get(invoice_id),
            self.store.payments.allocations_for_invoice(invoice_id),
        )?;
        if invoice.status.is_void() {
            return Err(InvoiceError::InvoiceVoid.into());
        }
        let balance = InvoiceService::invoice_balance(&invoice, &allocations);
        InvoiceService::validate_allocation(draft.amount, balance, self.config.currency())?;

        let payment = self
            .store
            .payments
            .insert_payment(&NewPayment {
                customer_id: invoice.customer_id,
                provider: draft.provider.trim().to_string(),
                reference: draft
                    .reference
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(ToString::to_string),
                amount: draft.amount,
                paid_at: draft.paid_at,
            })
            .await?;
        let allocated = self
            .store
            .payments
            .insert_allocation(&NewAllocation {
                payment_id: payment.id,
                invoice_id,
                allocated_amount: draft.amount,
            })
            .await;
        if let Err(err) = allocated {
            // An unallocated payment reads as customer credit.
            if let Err(cleanup) = self.store.payments.delete_payment(payment.id).await {
                warn!(
                    payment_id = %payment.id,
                    error = %cleanup,
                    "Could not remove unallocated payment"
                );
            }
            return Err(err.into());
        }
        info!(%invoice_id, payment_id = %payment.id, amount = %draft.amount, "Payment recorded");

        self.load(invoice_id).await
    }
}
