use chrono::NaiveDate;
use routebill_shared::types::{CustomerId, InvoiceId, RouteId, SubscriptionId};
use rust_decimal_macros::dec;

use super::error::RouteError;
use super::service::RouteService;
use super::types::{Route, RouteDraft, RouteFilter, RouteView};
use crate::invoice::{Invoice, InvoiceStatus, StatusTone};
use crate::pricing::BillingPeriod;
use crate::reports::ReceivableRow;
use crate::subscription::{Subscription, SubscriptionStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn route(name: &str, active: bool, coords: bool) -> Route {
    let coord = coords.then_some(dec!(-26.2041));
    Route {
        id: RouteId::new(),
        route_name: name.to_string(),
        origin_label: Some("Soweto".to_string()),
        destination_label: Some("Sandton".to_string()),
        origin_lat: coord,
        origin_lng: coord,
        destination_lat: coord,
        destination_lng: coord,
        is_active: active,
        created_at: None,
    }
}

fn subscription(
    route_id: RouteId,
    customer_id: CustomerId,
    seats: u32,
    status: SubscriptionStatus,
) -> Subscription {
    Subscription {
        id: SubscriptionId::new(),
        customer_id,
        route_id,
        billing_period: BillingPeriod::Monthly,
        seats,
        price_override: None,
        start_date: date(2024, 1, 1),
        next_period_start: None,
        status,
        notes: None,
        created_at: None,
    }
}

fn invoice_for(sub: &Subscription, total: rust_decimal::Decimal, status: InvoiceStatus) -> Invoice {
    Invoice {
        id: InvoiceId::new(),
        invoice_number: None,
        customer_id: sub.customer_id,
        subscription_id: Some(sub.id),
        period_start: date(2024, 6, 1),
        period_end: date(2024, 6, 30),
        total_amount: total,
        status,
        email_status: None,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn test_validate_route() {
    let draft = RouteDraft {
        route_name: "  Soweto Express ".to_string(),
        origin_label: "Soweto".to_string(),
        destination_label: " ".to_string(),
        is_active: true,
        ..RouteDraft::default()
    };
    let new = RouteService::validate_route(&draft).unwrap();
    assert_eq!(new.route_name, "Soweto Express");
    assert_eq!(new.origin_label.as_deref(), Some("Soweto"));
    assert_eq!(new.destination_label, None);

    assert_eq!(
        RouteService::validate_route(&RouteDraft::default()),
        Err(RouteError::NameRequired)
    );
}

#[test]
fn test_counts_and_badges() {
    let routes = vec![
        route("A", true, true),
        route("B", true, false),
        route("C", false, false),
    ];
    let counts = RouteService::counts(&routes);
    assert_eq!(counts.total, 3);
    assert_eq!(counts.active, 2);
    assert_eq!(counts.map_ready, 1);
    assert_eq!(counts.missing_coords, 2);

    assert_eq!(routes[0].label(), "ACTIVE • MAP READY");
    assert_eq!(routes[1].tone(), StatusTone::Amber);
    assert_eq!(routes[2].label(), "INACTIVE");
}

#[test]
fn test_filter() {
    let ready = route("Soweto Express", true, true);
    let stopped = route("Midrand Loop", false, false);

    let filter = RouteFilter {
        view: RouteView::MissingCoords,
        search: None,
    };
    assert!(!filter.matches(&ready));
    assert!(filter.matches(&stopped));

    let search = RouteFilter {
        view: RouteView::All,
        search: Some("midrand".to_string()),
    };
    assert!(search.matches(&stopped));
    assert!(!search.matches(&ready));
}

#[test]
fn test_rollups() {
    let north = route("North", true, true);
    let south = route("South", true, true);
    let alice = CustomerId::new();
    let bob = CustomerId::new();

    let subs = vec![
        subscription(north.id, alice, 2, SubscriptionStatus::Active),
        subscription(north.id, alice, 1, SubscriptionStatus::Active),
        subscription(north.id, bob, 5, SubscriptionStatus::Paused),
        subscription(south.id, bob, 3, SubscriptionStatus::Active),
    ];
    let invoices = vec![
        invoice_for(&subs[0], dec!(400), InvoiceStatus::Issued),
        invoice_for(&subs[1], dec!(200), InvoiceStatus::Void),
        invoice_for(&subs[3], dec!(300), InvoiceStatus::Paid),
    ];
    let receivables = vec![ReceivableRow {
        invoice_id: invoices[0].id,
        invoice_number: None,
        customer_id: alice,
        customer_name: None,
        subscription_id: Some(subs[0].id),
        period_start: date(2024, 6, 1),
        period_end: date(2024, 6, 30),
        total_amount: dec!(400),
        paid_amount: dec!(150),
        balance_amount: dec!(250),
    }];

    let rollups = RouteService::route_rollups(
        &[north.clone(), south.clone()],
        &subs,
        &invoices,
        &receivables,
    );

    assert_eq!(rollups[0].route_id, north.id);
    assert_eq!(rollups[0].active_customers, 1);
    assert_eq!(rollups[0].active_seats, 3);
    assert_eq!(rollups[0].invoiced, dec!(400));
    assert_eq!(rollups[0].outstanding, dec!(250));

    assert_eq!(rollups[1].active_seats, 3);
    assert_eq!(rollups[1].invoiced, dec!(300));
    assert_eq!(rollups[1].outstanding, dec!(0));
}

#[test]
fn test_subscription_mix() {
    let r = RouteId::new();
    let alice = CustomerId::new();
    let subs = vec![
        subscription(r, alice, 2, SubscriptionStatus::Active),
        subscription(r, CustomerId::new(), 1, SubscriptionStatus::Paused),
        subscription(r, alice, 1, SubscriptionStatus::Cancelled),
        subscription(RouteId::new(), alice, 9, SubscriptionStatus::Active),
    ];

    let mix = RouteService::subscription_mix(r, &subs);
    assert_eq!(mix.total, 3);
    assert_eq!(mix.active_customers, 1);
    assert_eq!(mix.active_seats, 2);
    assert_eq!(mix.paused, 1);
    assert_eq!(mix.cancelled, 1);
}
