//! Overview dashboard.

use std::sync::Arc;

use routebill_core::customer::CustomerCredit;
use routebill_core::reports::{PendingSendRow, PeriodSummary, ReceivableRow, ReportService};
use routebill_core::subscription::{ExpectedRevenue, SubscriptionService};
use routebill_shared::types::DateRange;
use routebill_shared::{AppResult, BillingConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::state::LoadGate;
use super::{Store, override_policy};
use crate::client::DataClient;

/// Everything the overview shows for one range.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewSnapshot {
    /// Reporting window.
    pub range: DateRange,
    /// Active customers.
    pub active_customers: u64,
    /// Active routes.
    pub active_routes: u64,
    /// Active subscriptions.
    pub active_subscriptions: u64,
    /// Invoiced, paid, due and pending totals with the trend.
    pub summary: PeriodSummary,
    /// Paid as a share of invoiced, 0 to 100.
    pub collection_percent: Decimal,
    /// Expected value of active subscriptions, priced at the range start.
    pub expected: ExpectedRevenue,
    /// Total credit held by customers.
    pub credit_total: Decimal,
    /// Customers holding the most credit.
    pub top_credit: Vec<CustomerCredit>,
    /// Largest receivables in the range.
    pub top_outstanding: Vec<ReceivableRow>,
    /// Invoices waiting to be emailed, regardless of range.
    pub pending_sends: Vec<PendingSendRow>,
}

/// Loads the overview dashboard.
#[derive(Clone)]
pub struct OverviewScreen {
    store: Store,
    config: BillingConfig,
    gate: Arc<LoadGate>,
}

impl OverviewScreen {
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
    pub async fn refresh(&self, range: DateRange) -> Option<AppResult<OverviewSnapshot>> {
        self.gate.run(self.load(range)).await
    }

    /// Loads the overview for `range`.
    #[instrument(skip(self), fields(from = %range.from(), to = %range.to()))]
    pub async fn load(&self, range: DateRange) -> AppResult<OverviewSnapshot> {
        let limit = self.config.list_limit;
        let store = &self.store;

        let (
            active_customers,
            active_routes,
            active_subscriptions,
            invoices,
            receivables,
            pending_sends,
            subscriptions,
            pricing,
            credit,
        ) = tokio::try_join!(
            store.customers.count_active(),
            store.routes.count_active(),
            store.subscriptions.count_active(),
            store.invoices.in_range(range, None, limit),
            store.views.receivables(Some(range), limit),
            store.views.pending_sends(None, limit),
            store.subscriptions.active(limit),
            store.pricing.covering(range.from()),
            store.views.customer_credit(limit),
        )?;

        let summary = ReportService::aggregate(
            &invoices,
            &receivables,
            &pending_sends,
            range,
            self.config.bucket_threshold_days,
        );
        let expected = SubscriptionService::expected_revenue(
            &subscriptions,
            &pricing,
            range.from(),
            override_policy(&self.config),
        );
        if !expected.unpriced.is_empty() {
            warn!(
                count = expected.unpriced.len(),
                as_of = %range.from(),
                "Active subscriptions without a price"
            );
        }

        let top = self.config.top_rows;
        let credit_total = CustomerCredit::total(&credit);
        let top_outstanding = receivables.into_iter().take(top).collect();
        let top_credit = credit.into_iter().take(top).collect();

        debug!(
            invoices = invoices.len(),
            buckets = summary.buckets.len(),
            "Overview loaded"
        );

        Ok(OverviewSnapshot {
            range,
            active_customers,
            active_routes,
            active_subscriptions,
            collection_percent: summary.collection_percent(),
            summary,
            expected,
            credit_total,
            top_credit,
            top_outstanding,
            pending_sends,
        })
    }
}
