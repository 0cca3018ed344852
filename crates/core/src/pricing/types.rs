//! Route pricing data types.

use chrono::{DateTime, NaiveDate, Utc};
use routebill_shared::types::{PricingId, RouteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How often a subscription is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    /// Billed every week.
    Weekly,
    /// Billed every calendar month.
    Monthly,
}

impl BillingPeriod {
    /// Returns the string representation used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One effective-dated price row for a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePricing {
    /// Pricing row ID.
    #[serde(rename = "pricing_id")]
    pub id: PricingId,
    /// Owning route.
    pub route_id: RouteId,
    /// Price per seat per week.
    pub weekly_price: Decimal,
    /// Price per seat per month.
    pub monthly_price: Decimal,
    /// First day the price applies.
    pub effective_from: NaiveDate,
    /// Last day the price applies; `None` is open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RoutePricing {
    /// Returns the price for the given billing period.
    #[must_use]
    pub const fn price_for(&self, period: BillingPeriod) -> Decimal {
        match period {
            BillingPeriod::Weekly => self.weekly_price,
            BillingPeriod::Monthly => self.monthly_price,
        }
    }

    /// Returns true if the row's interval contains `date` (both ends inclusive).
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| to >= date)
    }

    /// Returns true if the two rows' intervals share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let self_end = self.effective_to.unwrap_or(NaiveDate::MAX);
        let other_end = other.effective_to.unwrap_or(NaiveDate::MAX);
        self.effective_from <= other_end && other.effective_from <= self_end
    }
}

/// Outcome of resolving a route price on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceResolution {
    /// The winning pricing row.
    pub pricing_id: PricingId,
    /// When the winning row became effective.
    pub effective_from: NaiveDate,
    /// Unit price for the requested billing period.
    pub price: Decimal,
    /// Other rows that also cover the date, sorted by ID.
    ///
    /// Non-empty means the route's pricing history overlaps.
    pub conflicts: Vec<PricingId>,
}

impl PriceResolution {
    /// Returns true if more than one row covered the date.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Current weekly and monthly prices for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentPrices {
    /// Weekly unit price, if priced.
    pub weekly: Option<Decimal>,
    /// Monthly unit price, if priced.
    pub monthly: Option<Decimal>,
}

/// Two pricing rows of the same route whose intervals overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingOverlap {
    /// Row with the earlier (or equal) effective_from.
    pub first: PricingId,
    /// Row with the later (or equal) effective_from.
    pub second: PricingId,
}

/// Input for adding a pricing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoutePricing {
    /// Owning route.
    pub route_id: RouteId,
    /// Price per seat per week.
    pub weekly_price: Decimal,
    /// Price per seat per month.
    pub monthly_price: Decimal,
    /// First day the price applies.
    pub effective_from: NaiveDate,
    /// Last day the price applies.
    pub effective_to: Option<NaiveDate>,
}
