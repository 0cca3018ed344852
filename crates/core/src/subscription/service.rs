//! Subscription value estimation and validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::SubscriptionError;
use super::types::{
    ExpectedRevenue, NewSubscription, OverridePolicy, Subscription, SubscriptionDraft,
    SubscriptionStatus,
};
use crate::pricing::{PricingService, RoutePricing};

/// Service for subscription business logic.
pub struct SubscriptionService;

impl SubscriptionService {
    /// Unit price that applies to a subscription on `as_of`.
    ///
    /// An override that applies under `policy` wins over the route price.
    #[must_use]
    pub fn unit_price(
        subscription: &Subscription,
        rows: &[RoutePricing],
        policy: OverridePolicy,
        as_of: NaiveDate,
    ) -> Option<Decimal> {
        policy
            .applied_override(subscription.price_override)
            .or_else(|| {
                PricingService::resolve_price(
                    rows,
                    subscription.route_id,
                    subscription.billing_period,
                    as_of,
                )
            })
    }

    /// Expected value of one billing period, priced at the subscription's start date.
    #[must_use]
    pub fn estimate_value(
        subscription: &Subscription,
        rows: &[RoutePricing],
        policy: OverridePolicy,
    ) -> Option<Decimal> {
        Self::estimate_value_as_of(subscription, rows, policy, subscription.start_date)
    }

    /// Expected value of one billing period, priced at `as_of`.
    ///
    /// Returns `None` when neither an override nor a route price applies.
    #[must_use]
    pub fn estimate_value_as_of(
        subscription: &Subscription,
        rows: &[RoutePricing],
        policy: OverridePolicy,
        as_of: NaiveDate,
    ) -> Option<Decimal> {
        Self::unit_price(subscription, rows, policy, as_of)
            .map(|unit| unit * Decimal::from(subscription.seats))
    }

    /// Sums the estimates of active subscriptions at `as_of`.
    ///
    /// Unpriced subscriptions are listed rather than counted as zero.
    #[must_use]
    pub fn expected_revenue(
        subscriptions: &[Subscription],
        rows: &[RoutePricing],
        as_of: NaiveDate,
        policy: OverridePolicy,
    ) -> ExpectedRevenue {
        let mut revenue = ExpectedRevenue::default();

        for subscription in subscriptions.iter().filter(|s| s.is_active()) {
            match Self::estimate_value_as_of(subscription, rows, policy, as_of) {
                Some(value) => {
                    revenue.total += value;
                    revenue.priced_count += 1;
                }
                None => revenue.unpriced.push(subscription.id),
            }
        }

        revenue
    }

    /// Validates a subscription form and builds the insert.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in form order.
    pub fn validate_subscription(
        draft: &SubscriptionDraft,
    ) -> Result<NewSubscription, SubscriptionError> {
        let customer_id = draft.customer_id.ok_or(SubscriptionError::CustomerRequired)?;
        let route_id = draft.route_id.ok_or(SubscriptionError::RouteRequired)?;
        let billing_period = draft
            .billing_period
            .ok_or(SubscriptionError::BillingPeriodRequired)?;
        let start_date = draft.start_date.ok_or(SubscriptionError::StartDateRequired)?;

        if draft.seats < 1 {
            return Err(SubscriptionError::SeatsBelowOne);
        }
        let seats = u32::try_from(draft.seats).unwrap_or(u32::MAX);

        if draft.price_override.is_some_and(|p| p < Decimal::ZERO) {
            return Err(SubscriptionError::NegativeOverride);
        }

        let notes = draft
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        Ok(NewSubscription {
            customer_id,
            route_id,
            billing_period,
            seats,
            price_override: draft.price_override,
            start_date,
            next_period_start: start_date,
            status: SubscriptionStatus::Active,
            notes,
        })
    }
}
