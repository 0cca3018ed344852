//! Routes list and route detail with pricing history.

use std::sync::Arc;

use chrono::NaiveDate;
use routebill_core::invoice::StatusTone;
use routebill_core::pricing::{
    CurrentPrices, NewRoutePricing, PricingOverlap, PricingService, RoutePricing,
};
use routebill_core::route::{
    Route, RouteCounts, RouteDraft, RouteFilter, RouteRollup, RouteService, SubscriptionMix,
};
use routebill_core::subscription::Subscription;
use routebill_shared::types::{PricingId, RouteId};
use routebill_shared::{AppResult, BillingConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::Store;
use crate::client::DataClient;

/// One route in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    /// The route.
    pub route: Route,
    /// Badge text.
    pub label: &'static str,
    /// Badge colour.
    pub tone: StatusTone,
    /// Customers, seats and money on the route.
    pub rollup: RouteRollup,
}

/// The routes list.
#[derive(Debug, Clone, Serialize)]
pub struct RouteListSnapshot {
    /// Routes passing the filter, newest first.
    pub rows: Vec<RouteRow>,
    /// Counts over every route, ignoring the filter.
    pub counts: RouteCounts,
}

/// Everything shown for one route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDetail {
    /// The route.
    pub route: Route,
    /// Pricing history, latest first.
    pub pricing: Vec<RoutePricing>,
    /// Prices in force on the detail date.
    pub current: CurrentPrices,
    /// Overlapping pricing rows.
    pub overlaps: Vec<PricingOverlap>,
    /// Subscriptions on the route.
    pub subscriptions: Vec<Subscription>,
    /// Subscription breakdown.
    pub mix: SubscriptionMix,
    /// Non-void invoiced value.
    pub invoiced: Decimal,
    /// Outstanding receivables.
    pub outstanding: Decimal,
}

/// Loads the route screens and runs route and pricing actions.
#[derive(Clone)]
pub struct RoutesScreen {
    store: Store,
    config: BillingConfig,
}

impl RoutesScreen {
    /// Creates the screen service.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>, config: BillingConfig) -> Self {
        Self {
            store: Store::new(&client),
            config,
        }
    }

    /// Loads the route list with rollups.
    #[instrument(skip(self, filter))]
    pub async fn load(&self, filter: &RouteFilter) -> AppResult<RouteListSnapshot> {
        let limit = self.config.list_limit;
        let store = &self.store;
        let (routes, subscriptions, invoices, receivables) = tokio::try_join!(
            store.routes.list(limit),
            store.subscriptions.list(None, None, limit),
            store.invoices.non_void(limit),
            store.views.receivables(None, limit),
        )?;

        let counts = RouteService::counts(&routes);
        let rollups =
            RouteService::route_rollups(&routes, &subscriptions, &invoices, &receivables);
        let rows = routes
            .into_iter()
            .zip(rollups)
            .filter(|(route, _)| filter.matches(route))
            .map(|(route, rollup)| RouteRow {
                label: route.label(),
                tone: route.tone(),
                route,
                rollup,
            })
            .collect();

        Ok(RouteListSnapshot { rows, counts })
    }

    /// Creates a route and reloads the list.
    pub async fn create(
        &self,
        draft: &RouteDraft,
        filter: &RouteFilter,
    ) -> AppResult<(Route, RouteListSnapshot)> {
        let new_route = RouteService::validate_route(draft)?;
        let route = self.store.routes.insert(&new_route).await?;
        info!(route_id = %route.id, name = %route.route_name, "Route created");
        Ok((route, self.load(filter).await?))
    }

    /// Saves a route's details and reloads the list.
    pub async fn update(
        &self,
        id: RouteId,
        draft: &RouteDraft,
        filter: &RouteFilter,
    ) -> AppResult<RouteListSnapshot> {
        let route = RouteService::validate_route(draft)?;
        self.store.routes.update(id, &route).await?;
        info!(route_id = %id, "Route updated");
        self.load(filter).await
    }

    /// Activates or deactivates a route and reloads the list.
    pub async fn set_active(
        &self,
        id: RouteId,
        is_active: bool,
        filter: &RouteFilter,
    ) -> AppResult<RouteListSnapshot> {
        self.store.routes.set_active(id, is_active).await?;
        info!(route_id = %id, is_active, "Route status set");
        self.load(filter).await
    }

    /// Loads one route with its pricing as of `as_of`.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: RouteId, as_of: NaiveDate) -> AppResult<RouteDetail> {
        let store = &self.store;
        let (route, pricing, subscriptions) = tokio::try_join!(
            store.routes.get(id),
            store.pricing.for_route(id),
            store.subscriptions.for_route(id),
        )?;

        let ids: Vec<_> = subscriptions.iter().map(|s| s.id).collect();
        let (invoices, receivables) = tokio::try_join!(
            store.invoices.for_subscriptions(&ids),
            store.views.receivables_for_subscriptions(&ids),
        )?;

        let overlaps = PricingService::find_overlaps(&pricing, id);
        if !overlaps.is_empty() {
            warn!(route_id = %id, count = overlaps.len(), "Route pricing rows overlap");
        }
        let (invoiced, outstanding) = RouteService::route_rollups(
            std::slice::from_ref(&route),
            &subscriptions,
            &invoices,
            &receivables,
        )
        .into_iter()
        .next()
        .map(|r| (r.invoiced, r.outstanding))
        .unwrap_or_default();

        Ok(RouteDetail {
            current: PricingService::current_prices(&pricing, id, as_of),
            mix: RouteService::subscription_mix(id, &subscriptions),
            route,
            pricing,
            overlaps,
            subscriptions,
            invoiced,
            outstanding,
        })
    }

    /// Adds a pricing row and reloads the detail.
    ///
    /// A row overlapping existing history is saved anyway and logged.
    pub async fn add_pricing(
        &self,
        pricing: &NewRoutePricing,
        as_of: NaiveDate,
    ) -> AppResult<RouteDetail> {
        PricingService::validate_pricing(pricing)?;
        let row = self.store.pricing.insert(pricing).await?;
        info!(
            route_id = %row.route_id,
            pricing_id = %row.id,
            effective_from = %row.effective_from,
            "Pricing added"
        );
        self.detail(pricing.route_id, as_of).await
    }

    /// Removes a pricing row and reloads the detail.
    pub async fn delete_pricing(
        &self,
        route_id: RouteId,
        pricing_id: PricingId,
        as_of: NaiveDate,
    ) -> AppResult<RouteDetail> {
        self.store.pricing.delete(pricing_id).await?;
        info!(%route_id, %pricing_id, "Pricing removed");
        self.detail(route_id, as_of).await
    }
}
