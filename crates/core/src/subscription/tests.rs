//! Tests for the subscription value estimator.

use chrono::NaiveDate;
use proptest::prelude::*;
use routebill_shared::types::{CustomerId, PricingId, RouteId, SubscriptionId};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::SubscriptionError;
use super::service::SubscriptionService;
use super::types::{
    OverridePolicy, Subscription, SubscriptionDraft, SubscriptionFilter, SubscriptionStatus,
};
use crate::pricing::{BillingPeriod, RoutePricing};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pricing(route_id: RouteId) -> Vec<RoutePricing> {
    vec![
        RoutePricing {
            id: PricingId::new(),
            route_id,
            weekly_price: dec!(100),
            monthly_price: dec!(380),
            effective_from: date(2024, 1, 1),
            effective_to: Some(date(2024, 3, 31)),
            created_at: None,
        },
        RoutePricing {
            id: PricingId::new(),
            route_id,
            weekly_price: dec!(120),
            monthly_price: dec!(450),
            effective_from: date(2024, 4, 1),
            effective_to: None,
            created_at: None,
        },
    ]
}

fn subscription(route_id: RouteId, seats: u32, price_override: Option<Decimal>) -> Subscription {
    Subscription {
        id: SubscriptionId::new(),
        customer_id: CustomerId::new(),
        route_id,
        billing_period: BillingPeriod::Weekly,
        seats,
        price_override,
        start_date: date(2024, 2, 1),
        next_period_start: Some(date(2024, 2, 1)),
        status: SubscriptionStatus::Active,
        notes: None,
        created_at: None,
    }
}

#[test]
fn test_estimate_uses_route_price_at_start() {
    let route = RouteId::new();
    let sub = subscription(route, 3, None);

    assert_eq!(
        SubscriptionService::estimate_value(&sub, &pricing(route), OverridePolicy::ZeroIsFree),
        Some(dec!(300))
    );
}

#[test]
fn test_estimate_as_of_uses_later_price() {
    let route = RouteId::new();
    let sub = subscription(route, 3, None);

    assert_eq!(
        SubscriptionService::estimate_value_as_of(
            &sub,
            &pricing(route),
            OverridePolicy::ZeroIsFree,
            date(2024, 6, 1)
        ),
        Some(dec!(360))
    );
}

#[test]
fn test_override_wins() {
    let route = RouteId::new();
    let sub = subscription(route, 2, Some(dec!(75.50)));

    assert_eq!(
        SubscriptionService::estimate_value(&sub, &pricing(route), OverridePolicy::ZeroIsFree),
        Some(dec!(151.00))
    );
}

#[rstest]
#[case(OverridePolicy::ZeroIsFree, Some(dec!(0)))]
#[case(OverridePolicy::ZeroMeansAbsent, Some(dec!(200)))]
fn test_zero_override_policy(#[case] policy: OverridePolicy, #[case] expected: Option<Decimal>) {
    let route = RouteId::new();
    let sub = subscription(route, 2, Some(Decimal::ZERO));

    assert_eq!(
        SubscriptionService::estimate_value(&sub, &pricing(route), policy),
        expected
    );
}

#[test]
fn test_policy_from_config() {
    assert_eq!(OverridePolicy::from_config(true), OverridePolicy::ZeroIsFree);
    assert_eq!(
        OverridePolicy::from_config(false),
        OverridePolicy::ZeroMeansAbsent
    );
    assert_eq!(OverridePolicy::default(), OverridePolicy::ZeroIsFree);
}

#[test]
fn test_unpriced_is_none() {
    let route = RouteId::new();
    let sub = subscription(route, 2, None);

    assert_eq!(
        SubscriptionService::estimate_value(&sub, &[], OverridePolicy::ZeroIsFree),
        None
    );
}

#[test]
fn test_expected_revenue_counts_unpriced() {
    let route = RouteId::new();
    let unpriced_route = RouteId::new();
    let rows = pricing(route);

    let priced = subscription(route, 2, None);
    let overridden = subscription(unpriced_route, 1, Some(dec!(50)));
    let unpriced = subscription(unpriced_route, 4, None);
    let mut paused = subscription(route, 10, None);
    paused.status = SubscriptionStatus::Paused;

    let revenue = SubscriptionService::expected_revenue(
        &[priced, overridden, unpriced.clone(), paused],
        &rows,
        date(2024, 6, 1),
        OverridePolicy::ZeroIsFree,
    );

    assert_eq!(revenue.total, dec!(290));
    assert_eq!(revenue.priced_count, 2);
    assert_eq!(revenue.unpriced, vec![unpriced.id]);
}

fn valid_draft() -> SubscriptionDraft {
    SubscriptionDraft {
        customer_id: Some(CustomerId::new()),
        route_id: Some(RouteId::new()),
        billing_period: Some(BillingPeriod::Monthly),
        seats: 2,
        price_override: None,
        start_date: Some(date(2024, 7, 1)),
        notes: Some("  ".to_string()),
    }
}

#[test]
fn test_validate_builds_insert() {
    let new = SubscriptionService::validate_subscription(&valid_draft()).unwrap();

    assert_eq!(new.seats, 2);
    assert_eq!(new.next_period_start, new.start_date);
    assert_eq!(new.status, SubscriptionStatus::Active);
    assert_eq!(new.notes, None);
}

#[test]
fn test_validate_rejects_bad_forms() {
    let mut draft = valid_draft();
    draft.customer_id = None;
    assert_eq!(
        SubscriptionService::validate_subscription(&draft),
        Err(SubscriptionError::CustomerRequired)
    );

    let mut draft = valid_draft();
    draft.route_id = None;
    assert_eq!(
        SubscriptionService::validate_subscription(&draft),
        Err(SubscriptionError::RouteRequired)
    );

    let mut draft = valid_draft();
    draft.seats = 0;
    assert_eq!(
        SubscriptionService::validate_subscription(&draft),
        Err(SubscriptionError::SeatsBelowOne)
    );

    let mut draft = valid_draft();
    draft.price_override = Some(dec!(-0.01));
    assert_eq!(
        SubscriptionService::validate_subscription(&draft),
        Err(SubscriptionError::NegativeOverride)
    );
    assert_eq!(
        SubscriptionError::NegativeOverride.to_string(),
        "Price override cannot be negative."
    );
}

#[test]
fn test_filter_matches() {
    let sub = subscription(RouteId::new(), 1, None);
    let filter = SubscriptionFilter {
        status: Some(SubscriptionStatus::Active),
        billing_period: Some(BillingPeriod::Weekly),
        search: Some("  north ".to_string()),
    };
    assert!(filter.matches(&sub, &["Thandi", "North Loop"]));
    assert!(!filter.matches(&sub, &["Thandi", "South Loop"]));

    let paused_only = SubscriptionFilter {
        status: Some(SubscriptionStatus::Paused),
        ..SubscriptionFilter::default()
    };
    assert!(!paused_only.matches(&sub, &[]));
    assert!(SubscriptionFilter::default().matches(&sub, &[]));
}

proptest! {
    /// Property: without an override the estimate is linear in seats.
    #[test]
    fn test_estimate_linear_in_seats(seats in 1u32..500, k in 1u32..20) {
        let route = RouteId::new();
        let rows = pricing(route);
        let one = subscription(route, seats, None);
        let many = subscription(route, seats * k, None);

        let base = SubscriptionService::estimate_value(&one, &rows, OverridePolicy::ZeroIsFree).unwrap();
        let scaled = SubscriptionService::estimate_value(&many, &rows, OverridePolicy::ZeroIsFree).unwrap();
        prop_assert_eq!(scaled, base * Decimal::from(k));
    }
}
