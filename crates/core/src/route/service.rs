//! Route validation and per-route rollups.

use std::collections::{HashMap, HashSet};

use routebill_shared::types::{RouteId, SubscriptionId};
use rust_decimal::Decimal;

use super::error::RouteError;
use super::types::{NewRoute, Route, RouteCounts, RouteDraft, RouteRollup, SubscriptionMix};
use crate::invoice::Invoice;
use crate::reports::ReceivableRow;
use crate::subscription::{Subscription, SubscriptionStatus};

/// Service for route business logic.
pub struct RouteService;

impl RouteService {
    /// Validates a route form and builds the insert.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::NameRequired` if the trimmed name is blank.
    pub fn validate_route(draft: &RouteDraft) -> Result<NewRoute, RouteError> {
        let route_name = draft.route_name.trim();
        if route_name.is_empty() {
            return Err(RouteError::NameRequired);
        }

        Ok(NewRoute {
            route_name: route_name.to_string(),
            origin_label: non_blank(&draft.origin_label),
            destination_label: non_blank(&draft.destination_label),
            origin_lat: draft.origin_lat,
            origin_lng: draft.origin_lng,
            destination_lat: draft.destination_lat,
            destination_lng: draft.destination_lng,
            is_active: draft.is_active,
        })
    }

    /// Counts routes by activity and coordinate completeness.
    #[must_use]
    pub fn counts(routes: &[Route]) -> RouteCounts {
        let map_ready = routes.iter().filter(|r| r.has_coordinates()).count();
        RouteCounts {
            total: routes.len(),
            active: routes.iter().filter(|r| r.is_active).count(),
            map_ready,
            missing_coords: routes.len() - map_ready,
        }
    }

    /// Builds one rollup per route, in route order.
    ///
    /// Invoices and receivables reach a route through their subscription;
    /// rows without a known subscription are left out. Void invoices are
    /// not invoiced value.
    #[must_use]
    pub fn route_rollups(
        routes: &[Route],
        subscriptions: &[Subscription],
        invoices: &[Invoice],
        receivables: &[ReceivableRow],
    ) -> Vec<RouteRollup> {
        let route_of: HashMap<SubscriptionId, RouteId> =
            subscriptions.iter().map(|s| (s.id, s.route_id)).collect();

        let mut invoiced: HashMap<RouteId, Decimal> = HashMap::new();
        for invoice in invoices.iter().filter(|i| !i.status.is_void()) {
            if let Some(route_id) = invoice.subscription_id.and_then(|s| route_of.get(&s)) {
                *invoiced.entry(*route_id).or_default() += invoice.total_amount;
            }
        }

        let mut outstanding: HashMap<RouteId, Decimal> = HashMap::new();
        for row in receivables {
            if let Some(route_id) = row.subscription_id.and_then(|s| route_of.get(&s)) {
                *outstanding.entry(*route_id).or_default() += row.balance_amount;
            }
        }

        routes
            .iter()
            .map(|route| {
                let mix = Self::subscription_mix(route.id, subscriptions);
                RouteRollup {
                    route_id: route.id,
                    active_customers: mix.active_customers,
                    active_seats: mix.active_seats,
                    invoiced: invoiced.get(&route.id).copied().unwrap_or_default(),
                    outstanding: outstanding.get(&route.id).copied().unwrap_or_default(),
                }
            })
            .collect()
    }

    /// Subscription breakdown for one route.
    #[must_use]
    pub fn subscription_mix(route_id: RouteId, subscriptions: &[Subscription]) -> SubscriptionMix {
        let mut mix = SubscriptionMix::default();
        let mut customers = HashSet::new();

        for subscription in subscriptions.iter().filter(|s| s.route_id == route_id) {
            mix.total += 1;
            match subscription.status {
                SubscriptionStatus::Active => {
                    customers.insert(subscription.customer_id);
                    mix.active_seats += u64::from(subscription.seats);
                }
                SubscriptionStatus::Paused => mix.paused += 1,
                SubscriptionStatus::Cancelled => mix.cancelled += 1,
            }
        }

        mix.active_customers = customers.len();
        mix
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
