//! Customers list and customer detail.

use std::collections::HashMap;
use std::sync::Arc;

use routebill_core::customer::{
    Customer, CustomerCounts, CustomerDraft, CustomerFilter, CustomerService, CustomerStatus,
};
use routebill_core::invoice::{Invoice, InvoiceDraft, OUTSTANDING_EPSILON, StatusTone};
use routebill_core::route::Route;
use routebill_core::subscription::{Subscription, SubscriptionDraft, SubscriptionService};
use routebill_shared::types::CustomerId;
use routebill_shared::{AppResult, BillingConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::Store;
use crate::client::DataClient;

/// The customers list.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerListSnapshot {
    /// Customers passing the filter, by name.
    pub customers: Vec<Customer>,
    /// Counts over every customer, ignoring the filter.
    pub counts: CustomerCounts,
}

/// One invoice on the customer detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInvoiceRow {
    /// The invoice.
    pub invoice: Invoice,
    /// Invoice number, or a short ID when unassigned.
    pub display_number: String,
    /// Receivable balance.
    pub outstanding: Decimal,
    /// Status badge text.
    pub label: String,
    /// Status badge colour.
    pub tone: StatusTone,
}

/// Everything shown for one customer.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetail {
    /// The customer.
    pub customer: Customer,
    /// The customer's subscriptions.
    pub subscriptions: Vec<Subscription>,
    /// Non-void invoices, latest period first.
    pub invoices: Vec<CustomerInvoiceRow>,
    /// Invoices with more than a cent outstanding.
    pub outstanding_count: usize,
    /// Sum of outstanding balances.
    pub outstanding_total: Decimal,
    /// Unallocated payments held for the customer.
    pub credit: Decimal,
    /// Routes offered when adding a subscription.
    pub routes: Vec<Route>,
}

/// Loads the customer screens and runs customer actions.
#[derive(Clone)]
pub struct CustomersScreen {
    store: Store,
    config: BillingConfig,
}

impl CustomersScreen {
    /// Creates the screen service.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>, config: BillingConfig) -> Self {
        Self {
            store: Store::new(&client),
            config,
        }
    }

    /// Loads the customer list.
    #[instrument(skip(self, filter))]
    pub async fn load(&self, filter: &CustomerFilter) -> AppResult<CustomerListSnapshot> {
        let all = self
            .store
            .customers
            .list(None, self.config.list_limit)
            .await?;
        let counts = CustomerCounts::tally(&all);
        let customers = all.into_iter().filter(|c| filter.matches(c)).collect();
        Ok(CustomerListSnapshot { customers, counts })
    }

    /// Creates a customer and reloads the list.
    pub async fn create(
        &self,
        draft: &CustomerDraft,
        filter: &CustomerFilter,
    ) -> AppResult<(Customer, CustomerListSnapshot)> {
        let new_customer = CustomerService::validate_customer(draft)?;
        let customer = self.store.customers.insert(&new_customer).await?;
        info!(customer_id = %customer.id, "Customer created");
        Ok((customer, self.load(filter).await?))
    }

    /// Activates or inactivates a customer and reloads the list.
    ///
    /// Inactivation is refused while non-void invoices exist, unless that
    /// guard is switched off in configuration.
    pub async fn set_status(
        &self,
        id: CustomerId,
        status: CustomerStatus,
        filter: &CustomerFilter,
    ) -> AppResult<CustomerListSnapshot> {
        if status == CustomerStatus::Inactive && self.config.block_inactivation_with_invoices {
            let open = self.store.invoices.count_open_for_customer(id).await?;
            CustomerService::check_inactivation(open)?;
        }
        self.store.customers.set_status(id, status).await?;
        info!(customer_id = %id, status = status.as_str(), "Customer status set");
        self.load(filter).await
    }

    /// Loads one customer with subscriptions, invoices and balances.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: CustomerId) -> AppResult<CustomerDetail> {
        let store = &self.store;
        let (customer, subscriptions, invoices, receivables, credit, routes) = tokio::try_join!(
            store.customers.get(id),
            store.subscriptions.for_customer(id),
            store.invoices.for_customer(id),
            store.views.receivables_for_customer(id),
            store.views.credit_for_customer(id),
            store.routes.list(self.config.list_limit),
        )?;

        let balances: HashMap<_, _> = receivables
            .iter()
            .map(|r| (r.invoice_id, r.balance_amount))
            .collect();
        let invoices: Vec<_> = invoices
            .into_iter()
            .map(|invoice| {
                let outstanding = balances.get(&invoice.id).copied().unwrap_or_default();
                CustomerInvoiceRow {
                    display_number: invoice.display_number(),
                    label: invoice.status.label(outstanding),
                    tone: invoice.status.tone(outstanding),
                    outstanding,
                    invoice,
                }
            })
            .collect();
        let outstanding_count = invoices
            .iter()
            .filter(|row| row.outstanding > OUTSTANDING_EPSILON)
            .count();
        let outstanding_total = invoices.iter().map(|row| row.outstanding).sum();

        Ok(CustomerDetail {
            customer,
            subscriptions,
            invoices,
            outstanding_count,
            outstanding_total,
            credit: credit.map(|c| c.credit_balance).unwrap_or_default(),
            routes,
        })
    }

    /// Adds a subscription for the customer and reloads the detail.
    pub async fn create_subscription(
        &self,
        id: CustomerId,
        draft: &SubscriptionDraft,
    ) -> AppResult<CustomerDetail> {
        let draft = SubscriptionDraft {
            customer_id: Some(id),
            ..draft.clone()
        };
        let new_subscription = SubscriptionService::validate_subscription(&draft)?;
        let subscription = self.store.subscriptions.insert(&new_subscription).await?;
        info!(
            customer_id = %id,
            subscription_id = %subscription.id,
            route_id = %subscription.route_id,
            "Subscription created"
        );
        self.detail(id).await
    }

    /// Raises an invoice for the customer, with an optional first line, and
    /// reloads the detail.
    pub async fn create_invoice(
        &self,
        id: CustomerId,
        draft: &InvoiceDraft,
    ) -> AppResult<CustomerDetail> {
        let draft = InvoiceDraft {
            customer_id: Some(id),
            ..draft.clone()
        };
        self.store
            .create_invoice(&draft, self.config.currency())
            .await?;
        self.detail(id).await
    }
}
