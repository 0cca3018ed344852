//! Route data types.

use chrono::{DateTime, Utc};
use routebill_shared::types::RouteId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::StatusTone;

/// A served route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Route ID.
    #[serde(rename = "route_id")]
    pub id: RouteId,
    /// Route name.
    pub route_name: String,
    /// Where the route starts.
    #[serde(default)]
    pub origin_label: Option<String>,
    /// Where the route ends.
    #[serde(default)]
    pub destination_label: Option<String>,
    /// Origin latitude.
    #[serde(default)]
    pub origin_lat: Option<Decimal>,
    /// Origin longitude.
    #[serde(default)]
    pub origin_lng: Option<Decimal>,
    /// Destination latitude.
    #[serde(default)]
    pub destination_lat: Option<Decimal>,
    /// Destination longitude.
    #[serde(default)]
    pub destination_lng: Option<Decimal>,
    /// Whether the route is running.
    pub is_active: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Route {
    /// Returns true when all four coordinates are present.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.origin_lat.is_some()
            && self.origin_lng.is_some()
            && self.destination_lat.is_some()
            && self.destination_lng.is_some()
    }

    /// Badge text.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match (self.is_active, self.has_coordinates()) {
            (false, _) => "INACTIVE",
            (true, true) => "ACTIVE • MAP READY",
            (true, false) => "ACTIVE • NEEDS COORDS",
        }
    }

    /// Badge colour.
    #[must_use]
    pub const fn tone(&self) -> StatusTone {
        match (self.is_active, self.has_coordinates()) {
            (false, _) => StatusTone::Muted,
            (true, true) => StatusTone::Green,
            (true, false) => StatusTone::Amber,
        }
    }
}

/// Route form state before validation.
#[derive(Debug, Clone, Default)]
pub struct RouteDraft {
    /// Required.
    pub route_name: String,
    /// Blank becomes absent.
    pub origin_label: String,
    /// Blank becomes absent.
    pub destination_label: String,
    /// Origin latitude.
    pub origin_lat: Option<Decimal>,
    /// Origin longitude.
    pub origin_lng: Option<Decimal>,
    /// Destination latitude.
    pub destination_lat: Option<Decimal>,
    /// Destination longitude.
    pub destination_lng: Option<Decimal>,
    /// Whether the route is running.
    pub is_active: bool,
}

/// Validated route insert or full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoute {
    /// Trimmed name.
    pub route_name: String,
    /// Trimmed origin.
    pub origin_label: Option<String>,
    /// Trimmed destination.
    pub destination_label: Option<String>,
    /// Origin latitude.
    pub origin_lat: Option<Decimal>,
    /// Origin longitude.
    pub origin_lng: Option<Decimal>,
    /// Destination latitude.
    pub destination_lat: Option<Decimal>,
    /// Destination longitude.
    pub destination_lng: Option<Decimal>,
    /// Whether the route is running.
    pub is_active: bool,
}

/// Route list view filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteView {
    /// Every route.
    #[default]
    All,
    /// Running routes.
    Active,
    /// Stopped routes.
    Inactive,
    /// Routes with all coordinates.
    MapReady,
    /// Routes missing a coordinate.
    MissingCoords,
}

/// Route list filter.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
    /// Which routes to show.
    pub view: RouteView,
    /// Case-insensitive match on name, origin or destination.
    pub search: Option<String>,
}

impl RouteFilter {
    /// Returns true if the route passes the filter.
    #[must_use]
    pub fn matches(&self, route: &Route) -> bool {
        let in_view = match self.view {
            RouteView::All => true,
            RouteView::Active => route.is_active,
            RouteView::Inactive => !route.is_active,
            RouteView::MapReady => route.has_coordinates(),
            RouteView::MissingCoords => !route.has_coordinates(),
        };
        if !in_view {
            return false;
        }

        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            Some(route.route_name.as_str()),
            route.origin_label.as_deref(),
            route.destination_label.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Headline counts for the route list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteCounts {
    /// All routes.
    pub total: usize,
    /// Running routes.
    pub active: usize,
    /// Routes with all four coordinates.
    pub map_ready: usize,
    /// Routes missing at least one coordinate.
    pub missing_coords: usize,
}

/// Per-route subscription and billing totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRollup {
    /// The route.
    pub route_id: RouteId,
    /// Distinct customers with an active subscription.
    pub active_customers: usize,
    /// Seats across active subscriptions.
    pub active_seats: u64,
    /// Non-void invoice totals for the route's subscriptions.
    pub invoiced: Decimal,
    /// Receivable balances for the route's subscriptions.
    pub outstanding: Decimal,
}

/// Subscription breakdown on the route detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubscriptionMix {
    /// Distinct customers with an active subscription.
    pub active_customers: usize,
    /// Seats across active subscriptions.
    pub active_seats: u64,
    /// All subscriptions on the route.
    pub total: usize,
    /// Paused subscriptions.
    pub paused: usize,
    /// Cancelled subscriptions.
    pub cancelled: usize,
}
