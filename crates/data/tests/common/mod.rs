//! In-memory backend shared by the screen tests.
//!
//! Triggers stand in for the database: line totals, invoice totals, the
//! `accounts_receivable` view and payment-driven statuses are recomputed
//! after every write. The data set covers June 2024.

#![allow(dead_code)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Months, NaiveDate, SecondsFormat, TimeZone, Utc};
use routebill_core::customer::{Customer, CustomerCredit, CustomerStatus, CustomerType};
use routebill_core::invoice::{Invoice, InvoiceLine, InvoiceStatus, PaymentAllocation};
use routebill_core::pricing::{BillingPeriod, RoutePricing};
use routebill_core::reports::PendingSendRow;
use routebill_core::route::Route;
use routebill_core::subscription::{Subscription, SubscriptionStatus};
use routebill_data::client::Tables;
use routebill_data::{DataClient, InMemoryClient, Row};
use routebill_shared::BillingConfig;
use routebill_shared::types::{
    AllocationId, CustomerId, DateRange, InvoiceId, InvoiceLineId, PaymentId, PricingId, RouteId,
    SubscriptionId,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn june() -> DateRange {
    DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap()
}

pub fn seen_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

/// IDs of the seeded rows.
pub struct Fixture {
    pub client: InMemoryClient,
    pub alice: CustomerId,
    pub bob: CustomerId,
    pub carol: CustomerId,
    pub north: RouteId,
    pub south: RouteId,
    pub retired: RouteId,
    pub north_old_price: PricingId,
    pub north_price: PricingId,
    pub south_price: PricingId,
    pub alice_north: SubscriptionId,
    pub bob_south: SubscriptionId,
    pub alice_south: SubscriptionId,
    pub june_alice: InvoiceId,
    pub june_bob: InvoiceId,
    pub may_alice: InvoiceId,
    pub june_void: InvoiceId,
}

impl Fixture {
    pub fn data_client(&self) -> Arc<dyn DataClient> {
        Arc::new(self.client.clone())
    }

    pub fn config() -> BillingConfig {
        BillingConfig::default()
    }
}

fn customer(id: CustomerId, name: &str, email: &str, status: CustomerStatus) -> Customer {
    Customer {
        id,
        display_name: name.to_string(),
        email: Some(email.to_string()),
        phone: None,
        customer_type: CustomerType::default(),
        status,
        notes: None,
        created_at: None,
    }
}

fn route(id: RouteId, name: &str, active: bool, mapped: bool, created_day: u32) -> Route {
    let coord = mapped.then_some(dec!(-29.8));
    Route {
        id,
        route_name: name.to_string(),
        origin_label: None,
        destination_label: None,
        origin_lat: coord,
        origin_lng: coord,
        destination_lat: coord,
        destination_lng: coord,
        is_active: active,
        created_at: Utc.with_ymd_and_hms(2024, 1, created_day, 9, 0, 0).single(),
    }
}

fn pricing(
    id: PricingId,
    route_id: RouteId,
    weekly: Decimal,
    monthly: Decimal,
    from: NaiveDate,
    to: Option<NaiveDate>,
) -> RoutePricing {
    RoutePricing {
        id,
        route_id,
        weekly_price: weekly,
        monthly_price: monthly,
        effective_from: from,
        effective_to: to,
        created_at: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn subscription(
    id: SubscriptionId,
    customer_id: CustomerId,
    route_id: RouteId,
    billing_period: BillingPeriod,
    seats: u32,
    price_override: Option<Decimal>,
    start_date: NaiveDate,
    next_period_start: NaiveDate,
    status: SubscriptionStatus,
) -> Subscription {
    Subscription {
        id,
        customer_id,
        route_id,
        billing_period,
        seats,
        price_override,
        start_date,
        next_period_start: Some(next_period_start),
        status,
        notes: None,
        created_at: None,
    }
}

#[allow(clippy::too_many_arguments)]
fn invoice(
    id: InvoiceId,
    number: &str,
    customer_id: CustomerId,
    subscription_id: Option<SubscriptionId>,
    period: (NaiveDate, NaiveDate),
    total: Decimal,
    status: InvoiceStatus,
) -> Invoice {
    Invoice {
        id,
        invoice_number: Some(number.to_string()),
        customer_id,
        subscription_id,
        period_start: period.0,
        period_end: period.1,
        total_amount: total,
        status,
        email_status: None,
        created_at: None,
        updated_at: Some(seen_at()),
    }
}

fn line(invoice_id: InvoiceId, total: Decimal) -> InvoiceLine {
    InvoiceLine {
        id: InvoiceLineId::new(),
        invoice_id,
        description: "Monthly transport".to_string(),
        qty: Decimal::ONE,
        unit_price: total,
        line_total: Some(total),
        created_at: Some(seen_at()),
    }
}

fn allocation(invoice_id: InvoiceId, amount: Decimal) -> PaymentAllocation {
    PaymentAllocation {
        id: AllocationId::new(),
        payment_id: PaymentId::new(),
        invoice_id,
        allocated_amount: amount,
    }
}

/// Builds the June 2024 data set.
///
/// | invoice    | customer | period start | total | status         | paid |
/// |------------|----------|--------------|-------|----------------|------|
/// | june_alice | alice    | 2024-06-01   | 500   | partially_paid | 200  |
/// | june_bob   | bob      | 2024-06-03   | 300   | paid           | 300  |
/// | may_alice  | alice    | 2024-05-01   | 250   | overdue        | 0    |
/// | june_void  | bob      | 2024-06-10   | 999   | void           | 0    |
pub fn fixture() -> Fixture {
    let f = Fixture {
        client: InMemoryClient::new(),
        alice: CustomerId::new(),
        bob: CustomerId::new(),
        carol: CustomerId::new(),
        north: RouteId::new(),
        south: RouteId::new(),
        retired: RouteId::new(),
        north_old_price: PricingId::new(),
        north_price: PricingId::new(),
        south_price: PricingId::new(),
        alice_north: SubscriptionId::new(),
        bob_south: SubscriptionId::new(),
        alice_south: SubscriptionId::new(),
        june_alice: InvoiceId::new(),
        june_bob: InvoiceId::new(),
        may_alice: InvoiceId::new(),
        june_void: InvoiceId::new(),
    };
    let c = &f.client;

    c.seed(
        "customers",
        &[
            customer(f.alice, "Alice Dlamini", "alice@example.com", CustomerStatus::Active),
            customer(f.bob, "Bob Mokoena", "bob@example.com", CustomerStatus::Active),
            customer(f.carol, "Carol Naidoo", "carol@example.com", CustomerStatus::Inactive),
        ],
    )
    .unwrap();

    c.seed(
        "routes",
        &[
            route(f.north, "Durban North", true, true, 3),
            route(f.south, "Umhlanga South", true, false, 2),
            route(f.retired, "Retired Loop", false, false, 1),
        ],
    )
    .unwrap();

    c.seed(
        "route_pricing",
        &[
            pricing(
                f.north_old_price,
                f.north,
                dec!(100),
                dec!(400),
                date(2024, 1, 1),
                Some(date(2024, 3, 31)),
            ),
            pricing(f.north_price, f.north, dec!(120), dec!(450), date(2024, 4, 1), None),
            pricing(f.south_price, f.south, dec!(80), dec!(300), date(2024, 1, 1), None),
        ],
    )
    .unwrap();

    c.seed(
        "subscriptions",
        &[
            subscription(
                f.alice_north,
                f.alice,
                f.north,
                BillingPeriod::Monthly,
                2,
                None,
                date(2024, 1, 1),
                date(2024, 6, 1),
                SubscriptionStatus::Active,
            ),
            subscription(
                f.bob_south,
                f.bob,
                f.south,
                BillingPeriod::Weekly,
                1,
                Some(Decimal::ZERO),
                date(2024, 3, 4),
                date(2024, 6, 10),
                SubscriptionStatus::Active,
            ),
            subscription(
                f.alice_south,
                f.alice,
                f.south,
                BillingPeriod::Monthly,
                3,
                None,
                date(2024, 2, 1),
                date(2024, 3, 1),
                SubscriptionStatus::Paused,
            ),
        ],
    )
    .unwrap();

    let invoices = [
        invoice(
            f.june_alice,
            "INV-0101",
            f.alice,
            Some(f.alice_north),
            (date(2024, 6, 1), date(2024, 6, 30)),
            dec!(500),
            InvoiceStatus::PartiallyPaid,
        ),
        invoice(
            f.june_bob,
            "INV-0102",
            f.bob,
            Some(f.bob_south),
            (date(2024, 6, 3), date(2024, 6, 9)),
            dec!(300),
            InvoiceStatus::Paid,
        ),
        invoice(
            f.may_alice,
            "INV-0100",
            f.alice,
            Some(f.alice_north),
            (date(2024, 5, 1), date(2024, 5, 31)),
            dec!(250),
            InvoiceStatus::Overdue,
        ),
        invoice(
            f.june_void,
            "INV-0103",
            f.bob,
            None,
            (date(2024, 6, 10), date(2024, 6, 16)),
            dec!(999),
            InvoiceStatus::Void,
        ),
    ];
    c.seed("invoices", &invoices).unwrap();
    c.seed(
        "invoice_lines",
        &invoices
            .iter()
            .map(|i| line(i.id, i.total_amount))
            .collect::<Vec<_>>(),
    )
    .unwrap();
    c.seed(
        "payment_allocations",
        &[
            allocation(f.june_alice, dec!(200)),
            allocation(f.june_bob, dec!(300)),
        ],
    )
    .unwrap();

    c.seed(
        "invoices_to_email",
        &[
            PendingSendRow {
                invoice_id: f.june_alice,
                total_amount: dec!(500),
                balance_amount: dec!(300),
                period_start: Some(date(2024, 6, 1)),
            },
            PendingSendRow {
                invoice_id: f.may_alice,
                total_amount: dec!(250),
                balance_amount: dec!(250),
                period_start: Some(date(2024, 5, 1)),
            },
        ],
    )
    .unwrap();
    c.seed(
        "customer_credit",
        &[
            CustomerCredit {
                customer_id: f.alice,
                display_name: Some("Alice Dlamini".into()),
                email: Some("alice@example.com".into()),
                credit_balance: dec!(50),
            },
            CustomerCredit {
                customer_id: f.bob,
                display_name: Some("Bob Mokoena".into()),
                email: Some("bob@example.com".into()),
                credit_balance: Decimal::ZERO,
            },
        ],
    )
    .unwrap();

    install_backend(c);
    build_receivables(c);
    f
}

/// Registers the triggers and procedures.
fn install_backend(c: &InMemoryClient) {
    c.register_trigger("invoices", recompute);
    c.register_trigger("invoice_lines", recompute);
    c.register_trigger("payment_allocations", |tables| {
        settle_statuses(tables);
        recompute(tables);
    });
    c.register_procedure("next_invoice_number", |tables, _| {
        let n = tables.get("invoices").map_or(0, Vec::len) + 101;
        Ok(json!(format!("INV-{n:04}")))
    });
    c.register_procedure("generate_due_invoices", |tables, args| {
        let run_date = args["p_run_date"]
            .as_str()
            .and_then(|s| s.parse::<NaiveDate>().ok())
            .unwrap();
        let (created, skipped) = generate_due(tables, run_date);
        recompute(tables);
        Ok(json!([{ "created_count": created, "skipped_count": skipped }]))
    });
}

/// Builds the receivables view for the seeded rows. Triggers only fire on
/// writes.
fn build_receivables(c: &InMemoryClient) {
    let mut tables = Tables::new();
    for table in [
        "customers",
        "invoices",
        "invoice_lines",
        "payment_allocations",
    ] {
        tables.insert(table.to_string(), c.rows(table));
    }
    recompute(&mut tables);
    let receivables = tables.remove("accounts_receivable").unwrap_or_default();
    c.seed("accounts_receivable", &receivables).unwrap();
}

fn dec_of(row: &Row, key: &str) -> Decimal {
    match row.get(key) {
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        Some(Value::Number(n)) => n.to_string().parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

fn str_of<'a>(row: &'a Row, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn paid_by_invoice(tables: &Tables) -> std::collections::HashMap<String, Decimal> {
    let mut paid = std::collections::HashMap::new();
    for a in tables.get("payment_allocations").into_iter().flatten() {
        *paid
            .entry(str_of(a, "invoice_id").to_string())
            .or_insert(Decimal::ZERO) += dec_of(a, "allocated_amount");
    }
    paid
}

/// Line totals, invoice totals and the receivables view.
fn recompute(tables: &mut Tables) {
    let mut totals = std::collections::HashMap::<String, Decimal>::new();
    if let Some(lines) = tables.get_mut("invoice_lines") {
        for line in lines.iter_mut() {
            let total = dec_of(line, "qty") * dec_of(line, "unit_price");
            line.insert("line_total".into(), json!(total.to_string()));
            *totals
                .entry(str_of(line, "invoice_id").to_string())
                .or_insert(Decimal::ZERO) += total;
        }
    }

    if let Some(invoices) = tables.get_mut("invoices") {
        for invoice in invoices.iter_mut() {
            let total = totals
                .get(str_of(invoice, "invoice_id"))
                .copied()
                .unwrap_or_default();
            invoice.insert("total_amount".into(), json!(total.to_string()));
            if invoice.get("updated_at").is_none_or(Value::is_null) {
                invoice.insert("updated_at".into(), json!(now()));
            }
        }
    }

    let paid = paid_by_invoice(tables);
    let names: std::collections::HashMap<String, String> = tables
        .get("customers")
        .into_iter()
        .flatten()
        .map(|c| {
            (
                str_of(c, "customer_id").to_string(),
                str_of(c, "display_name").to_string(),
            )
        })
        .collect();

    let receivables: Vec<Row> = tables
        .get("invoices")
        .into_iter()
        .flatten()
        .filter(|i| str_of(i, "status") != "void")
        .filter_map(|i| {
            let id = str_of(i, "invoice_id");
            let total = dec_of(i, "total_amount");
            let paid = paid.get(id).copied().unwrap_or_default();
            let balance = (total - paid).max(Decimal::ZERO);
            if balance <= Decimal::ZERO {
                return None;
            }
            let customer_id = str_of(i, "customer_id");
            let row = json!({
                "invoice_id": id,
                "invoice_number": i.get("invoice_number"),
                "customer_id": customer_id,
                "customer_name": names.get(customer_id),
                "subscription_id": i.get("subscription_id"),
                "period_start": i.get("period_start"),
                "period_end": i.get("period_end"),
                "total_amount": total.to_string(),
                "paid_amount": paid.to_string(),
                "balance_amount": balance.to_string(),
            });
            match row {
                Value::Object(map) => Some(map),
                _ => None,
            }
        })
        .collect();
    tables.insert("accounts_receivable".into(), receivables);
}

/// Moves invoices to paid or partially paid as allocations arrive.
fn settle_statuses(tables: &mut Tables) {
    let paid = paid_by_invoice(tables);
    let Some(invoices) = tables.get_mut("invoices") else {
        return;
    };
    for invoice in invoices.iter_mut() {
        if str_of(invoice, "status") == "void" {
            continue;
        }
        let Some(amount) = paid.get(str_of(invoice, "invoice_id")).copied() else {
            continue;
        };
        let status = if amount >= dec_of(invoice, "total_amount") {
            "paid"
        } else {
            "partially_paid"
        };
        invoice.insert("status".into(), json!(status));
        invoice.insert("updated_at".into(), json!(now()));
    }
}

/// Raises one invoice per active subscription whose next period has started,
/// skipping periods already invoiced.
fn generate_due(tables: &mut Tables, run_date: NaiveDate) -> (u64, u64) {
    let due: Vec<Row> = tables
        .get("subscriptions")
        .into_iter()
        .flatten()
        .filter(|s| str_of(s, "status") == "active")
        .filter(|s| {
            str_of(s, "next_period_start")
                .parse::<NaiveDate>()
                .is_ok_and(|d| d <= run_date)
        })
        .cloned()
        .collect();

    let (mut created, mut skipped) = (0, 0);
    for sub in due {
        let sub_id = str_of(&sub, "subscription_id");
        let start = str_of(&sub, "next_period_start");
        let exists = tables.get("invoices").into_iter().flatten().any(|i| {
            str_of(i, "subscription_id") == sub_id && str_of(i, "period_start") == start
        });
        if exists {
            skipped += 1;
            continue;
        }

        let start_date: NaiveDate = start.parse().unwrap();
        let end = if str_of(&sub, "billing_period") == "weekly" {
            start_date + Duration::days(6)
        } else {
            start_date + Months::new(1) - Duration::days(1)
        };
        let invoices = tables.entry("invoices".into()).or_default();
        let number = format!("INV-{:04}", invoices.len() + 101);
        let row = json!({
            "invoice_id": InvoiceId::new(),
            "invoice_number": number,
            "customer_id": sub.get("customer_id"),
            "subscription_id": sub_id,
            "period_start": start,
            "period_end": end,
            "total_amount": "0",
            "status": "issued",
            "created_at": now(),
            "updated_at": now(),
        });
        if let Value::Object(map) = row {
            invoices.push(map);
        }
        created += 1;
    }
    (created, skipped)
}
