//! Subscriptions list and subscription detail.

use std::collections::HashMap;
use std::sync::Arc;

use routebill_core::customer::Customer;
use routebill_core::invoice::Invoice;
use routebill_core::pricing::{PriceResolution, PricingService, RoutePricing};
use routebill_core::route::Route;
use routebill_core::subscription::{
    Subscription, SubscriptionDraft, SubscriptionFilter, SubscriptionService, SubscriptionStatus,
};
use routebill_shared::types::SubscriptionId;
use routebill_shared::{AppResult, BillingConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{Store, override_policy};
use crate::client::DataClient;

/// One subscription in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRow {
    /// The subscription.
    pub subscription: Subscription,
    /// Customer display name.
    pub customer_name: Option<String>,
    /// Customer email.
    pub customer_email: Option<String>,
    /// Route name.
    pub route_name: Option<String>,
    /// Unit price on the start date; `None` when unpriced.
    pub unit_price: Option<Decimal>,
    /// Unit price times seats.
    pub estimated_value: Option<Decimal>,
}

/// The subscriptions list.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionListSnapshot {
    /// Subscriptions passing the filter, newest first.
    pub rows: Vec<SubscriptionRow>,
    /// Rows without a price.
    pub unpriced_count: usize,
}

/// Everything shown for one subscription.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDetail {
    /// The subscription.
    pub subscription: Subscription,
    /// Subscribing customer.
    pub customer: Customer,
    /// Subscribed route.
    pub route: Route,
    /// The route's pricing history.
    pub pricing: Vec<RoutePricing>,
    /// Which pricing row applies on the start date.
    pub resolution: Option<PriceResolution>,
    /// Unit price after any override.
    pub unit_price: Option<Decimal>,
    /// Unit price times seats.
    pub estimated_value: Option<Decimal>,
    /// Invoices raised for the subscription.
    pub invoices: Vec<Invoice>,
}

/// Loads the subscription screens and runs subscription actions.
#[derive(Clone)]
pub struct SubscriptionsScreen {
    store: Store,
    config: BillingConfig,
}

impl SubscriptionsScreen {
    /// Creates the screen service.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>, config: BillingConfig) -> Self {
        Self {
            store: Store::new(&client),
            config,
        }
    }

    /// Loads the subscription list, pricing each row at its start date.
    #[instrument(skip(self, filter))]
    pub async fn load(&self, filter: &SubscriptionFilter) -> AppResult<SubscriptionListSnapshot> {
        let limit = self.config.list_limit;
        let store = &self.store;
        let (subscriptions, customers, routes, pricing) = tokio::try_join!(
            store
                .subscriptions
                .list(filter.status, filter.billing_period, limit),
            store.customers.list(None, limit),
            store.routes.list(limit),
            store.pricing.all(limit),
        )?;

        let customers: HashMap<_, _> = customers.into_iter().map(|c| (c.id, c)).collect();
        let routes: HashMap<_, _> = routes.into_iter().map(|r| (r.id, r)).collect();
        let policy = override_policy(&self.config);

        let rows: Vec<_> = subscriptions
            .into_iter()
            .filter_map(|subscription| {
                let customer = customers.get(&subscription.customer_id);
                let route = routes.get(&subscription.route_id);
                let haystack: Vec<&str> = [
                    customer.map(|c| c.display_name.as_str()),
                    customer.and_then(|c| c.email.as_deref()),
                    route.map(|r| r.route_name.as_str()),
                ]
                .into_iter()
                .flatten()
                .collect();
                if !filter.matches(&subscription, &haystack) {
                    return None;
                }

                let unit_price = SubscriptionService::unit_price(
                    &subscription,
                    &pricing,
                    policy,
                    subscription.start_date,
                );
                Some(SubscriptionRow {
                    customer_name: customer.map(|c| c.display_name.clone()),
                    customer_email: customer.and_then(|c| c.email.clone()),
                    route_name: route.map(|r| r.route_name.clone()),
                    estimated_value: SubscriptionService::estimate_value(
                        &subscription,
                        &pricing,
                        policy,
                    ),
                    unit_price,
                    subscription,
                })
            })
            .collect();

        let unpriced_count = rows.iter().filter(|r| r.unit_price.is_none()).count();
        if unpriced_count > 0 {
            warn!(count = unpriced_count, "Subscriptions without a price on their start date");
        }
        debug!(rows = rows.len(), "Subscriptions loaded");

        Ok(SubscriptionListSnapshot {
            rows,
            unpriced_count,
        })
    }

    /// Creates a subscription and reloads the list.
    pub async fn create(
        &self,
        draft: &SubscriptionDraft,
        filter: &SubscriptionFilter,
    ) -> AppResult<(Subscription, SubscriptionListSnapshot)> {
        let new_subscription = SubscriptionService::validate_subscription(draft)?;
        let subscription = self.store.subscriptions.insert(&new_subscription).await?;
        info!(
            subscription_id = %subscription.id,
            customer_id = %subscription.customer_id,
            route_id = %subscription.route_id,
            "Subscription created"
        );
        Ok((subscription, self.load(filter).await?))
    }

    /// Pauses, resumes or cancels a subscription and reloads the list.
    pub async fn set_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
        filter: &SubscriptionFilter,
    ) -> AppResult<SubscriptionListSnapshot> {
        self.store.subscriptions.set_status(id, status).await?;
        info!(subscription_id = %id, %status, "Subscription status set");
        self.load(filter).await
    }

    /// Loads one subscription with its customer, route, pricing and invoices.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: SubscriptionId) -> AppResult<SubscriptionDetail> {
        let store = &self.store;
        let subscription = store.subscriptions.get(id).await?;
        let ids = [id];
        let (customer, route, pricing, invoices) = tokio::try_join!(
            store.customers.get(subscription.customer_id),
            store.routes.get(subscription.route_id),
            store.pricing.for_route(subscription.route_id),
            store.invoices.for_subscriptions(&ids),
        )?;

        let resolution = PricingService::resolve(
            &pricing,
            subscription.route_id,
            subscription.billing_period,
            subscription.start_date,
        );
        if let Some(resolution) = resolution.as_ref().filter(|r| r.is_ambiguous()) {
            warn!(
                subscription_id = %id,
                pricing_id = %resolution.pricing_id,
                conflicts = resolution.conflicts.len(),
                "Several pricing rows cover the start date"
            );
        }
        let policy = override_policy(&self.config);
        let unit_price = SubscriptionService::unit_price(
            &subscription,
            &pricing,
            policy,
            subscription.start_date,
        );

        Ok(SubscriptionDetail {
            estimated_value: SubscriptionService::estimate_value(&subscription, &pricing, policy),
            unit_price,
            subscription,
            customer,
            route,
            pricing,
            resolution,
            invoices,
        })
    }
}
