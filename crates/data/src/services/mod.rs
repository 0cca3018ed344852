//! Screen services.
//!
//! Each screen loads a typed snapshot by fanning out independent reads
//! concurrently, then derives its aggregates with the core services.
//! Mutations run a guard, write, and return a freshly loaded snapshot.

pub mod billing;
pub mod customers;
pub mod invoice_view;
pub mod overview;
pub mod routes;
pub mod state;
pub mod subscriptions;

pub use billing::{BillingKpis, BillingParams, BillingRow, BillingScreen, BillingSnapshot};
pub use customers::{
    CustomerDetail, CustomerInvoiceRow, CustomerListSnapshot, CustomersScreen,
};
pub use invoice_view::{InvoiceScreen, InvoiceSnapshot, PaymentDraft};
pub use overview::{OverviewScreen, OverviewSnapshot};
pub use routes::{RouteDetail, RouteListSnapshot, RouteRow, RoutesScreen};
pub use state::{LoadGate, LoadTicket, Notice, NoticeKind, ScreenState};
pub use subscriptions::{
    SubscriptionDetail, SubscriptionListSnapshot, SubscriptionRow, SubscriptionsScreen,
};

use std::sync::Arc;

use routebill_core::invoice::{Invoice, InvoiceDraft, InvoiceService};
use routebill_core::subscription::OverridePolicy;
use routebill_shared::types::Currency;
use routebill_shared::{AppResult, BillingConfig};
use tracing::info;

use crate::client::DataClient;
use crate::procedures::Procedures;
use crate::repositories::{
    CustomerRepository, InvoiceRepository, PaymentRepository, PricingRepository,
    RouteRepository, SubscriptionRepository, ViewRepository,
};

/// Every repository over one client.
#[derive(Clone)]
struct Store {
    customers: CustomerRepository,
    routes: RouteRepository,
    pricing: PricingRepository,
    subscriptions: SubscriptionRepository,
    invoices: InvoiceRepository,
    payments: PaymentRepository,
    views: ViewRepository,
    procedures: Procedures,
}

impl Store {
    fn new(client: &Arc<dyn DataClient>) -> Self {
        Self {
            customers: CustomerRepository::new(Arc::clone(client)),
            routes: RouteRepository::new(Arc::clone(client)),
            pricing: PricingRepository::new(Arc::clone(client)),
            subscriptions: SubscriptionRepository::new(Arc::clone(client)),
            invoices: InvoiceRepository::new(Arc::clone(client)),
            payments: PaymentRepository::new(Arc::clone(client)),
            views: ViewRepository::new(Arc::clone(client)),
            procedures: Procedures::new(Arc::clone(client)),
        }
    }

    /// Inserts an invoice and its optional first line.
    ///
    /// A blank number is replaced with one from `next_invoice_number`.
    async fn create_invoice(&self, draft: &InvoiceDraft, currency: Currency) -> AppResult<Invoice> {
        let mut new_invoice = InvoiceService::validate_invoice(draft)?;
        if new_invoice.invoice_number.is_none() {
            new_invoice.invoice_number = Some(self.procedures.next_invoice_number().await?);
        }

        let invoice = self.invoices.insert(&new_invoice).await?;
        if let Some(line) = &draft.initial_line {
            let line =
                InvoiceService::validate_line(invoice.id, line, invoice.total_amount, currency)?;
            self.invoices.insert_line(&line).await?;
        }
        info!(
            invoice_id = %invoice.id,
            customer_id = %invoice.customer_id,
            number = ?invoice.invoice_number,
            "Invoice created"
        );
        Ok(invoice)
    }
}

fn override_policy(config: &BillingConfig) -> OverridePolicy {
    OverridePolicy::from_config(config.zero_override_is_free)
}
