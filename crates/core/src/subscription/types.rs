//! Subscription data types.

use chrono::{DateTime, NaiveDate, Utc};
use routebill_shared::types::{CustomerId, RouteId, SubscriptionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::BillingPeriod;

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Billed by invoice runs.
    Active,
    /// Temporarily not billed.
    Paused,
    /// Ended.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns the string representation used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's recurring seat booking on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID.
    #[serde(rename = "subscription_id")]
    pub id: SubscriptionId,
    /// Subscribed customer.
    pub customer_id: CustomerId,
    /// Subscribed route.
    pub route_id: RouteId,
    /// Billing cadence.
    pub billing_period: BillingPeriod,
    /// Booked seats.
    pub seats: u32,
    /// Unit price replacing the route price. `None` is distinct from zero.
    #[serde(default)]
    pub price_override: Option<Decimal>,
    /// First billed day.
    pub start_date: NaiveDate,
    /// Start of the next period the invoice run will bill.
    #[serde(default)]
    pub next_period_start: Option<NaiveDate>,
    /// Lifecycle status.
    pub status: SubscriptionStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Returns true if the subscription is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

/// How an explicit zero price override is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverridePolicy {
    /// Zero is a legitimate free override.
    #[default]
    ZeroIsFree,
    /// Zero falls back to the resolved route price.
    ZeroMeansAbsent,
}

impl OverridePolicy {
    /// Builds the policy from the `billing.zero_override_is_free` setting.
    #[must_use]
    pub const fn from_config(zero_override_is_free: bool) -> Self {
        if zero_override_is_free {
            Self::ZeroIsFree
        } else {
            Self::ZeroMeansAbsent
        }
    }

    /// Returns the override that applies under this policy, if any.
    #[must_use]
    pub fn applied_override(self, price_override: Option<Decimal>) -> Option<Decimal> {
        match (self, price_override) {
            (Self::ZeroMeansAbsent, Some(price)) if price.is_zero() => None,
            (_, price) => price,
        }
    }
}

/// Expected revenue over a set of subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpectedRevenue {
    /// Sum of estimates for priced active subscriptions.
    pub total: Decimal,
    /// Active subscriptions that contributed to `total`.
    pub priced_count: usize,
    /// Active subscriptions with neither an override nor a route price.
    pub unpriced: Vec<SubscriptionId>,
}

/// Subscription form state before validation.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionDraft {
    /// Selected customer.
    pub customer_id: Option<CustomerId>,
    /// Selected route.
    pub route_id: Option<RouteId>,
    /// Billing cadence.
    pub billing_period: Option<BillingPeriod>,
    /// Requested seats; anything below one is rejected.
    pub seats: i64,
    /// Optional unit price override.
    pub price_override: Option<Decimal>,
    /// First billed day.
    pub start_date: Option<NaiveDate>,
    /// Notes; blank becomes absent.
    pub notes: Option<String>,
}

/// Validated subscription insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscription {
    /// Subscribed customer.
    pub customer_id: CustomerId,
    /// Subscribed route.
    pub route_id: RouteId,
    /// Billing cadence.
    pub billing_period: BillingPeriod,
    /// Booked seats.
    pub seats: u32,
    /// Unit price override.
    pub price_override: Option<Decimal>,
    /// First billed day.
    pub start_date: NaiveDate,
    /// Always equal to `start_date` on creation.
    pub next_period_start: NaiveDate,
    /// Always active on creation.
    pub status: SubscriptionStatus,
    /// Notes.
    pub notes: Option<String>,
}

/// Subscription list filter.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    /// Only this status.
    pub status: Option<SubscriptionStatus>,
    /// Only this billing period.
    pub billing_period: Option<BillingPeriod>,
    /// Case-insensitive match on customer name, email or route name.
    pub search: Option<String>,
}

impl SubscriptionFilter {
    /// Returns true if the subscription passes the status and period filters
    /// and any of `haystack` contains the search text.
    #[must_use]
    pub fn matches(&self, subscription: &Subscription, haystack: &[&str]) -> bool {
        if self.status.is_some_and(|s| s != subscription.status) {
            return false;
        }
        if self
            .billing_period
            .is_some_and(|p| p != subscription.billing_period)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                haystack
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}
