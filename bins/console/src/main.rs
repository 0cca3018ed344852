//! Routebill billing console.
//!
//! Loads one screen against the hosted backend and prints it as JSON.
//!
//! Usage:
//!   routebill overview [FROM TO]
//!   routebill billing [FROM TO]
//!   routebill customers | routes | subscriptions
//!   routebill invoice INVOICE_ID
//!   routebill run-invoices [DATE]

use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routebill_core::customer::CustomerFilter;
use routebill_core::route::RouteFilter;
use routebill_core::subscription::SubscriptionFilter;
use routebill_data::services::{
    BillingParams, BillingScreen, CustomersScreen, InvoiceScreen, OverviewScreen, RoutesScreen,
    ScreenState, SubscriptionsScreen,
};
use routebill_data::{DataClient, InvoiceRunMode, RestClient};
use routebill_shared::{AppConfig, AppResult};
use routebill_shared::types::{DateRange, InvoiceId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routebill=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let client: Arc<dyn DataClient> = Arc::new(RestClient::new(&config.backend)?);
    let billing = config.billing;
    info!(url = %config.backend.url, currency = %billing.currency(), "Console configured");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map_or("overview", String::as_str);
    let rest = args.get(1..).unwrap_or_default();
    let today = Local::now().date_naive();

    match command {
        "overview" => {
            let range = range_arg(rest, today)?;
            show(OverviewScreen::new(client, billing).refresh(range).await)
        }
        "billing" => {
            let params = BillingParams::for_range(range_arg(rest, today)?);
            show(BillingScreen::new(client, billing).refresh(&params).await)
        }
        "customers" => print(
            &CustomersScreen::new(client, billing)
                .load(&CustomerFilter::default())
                .await?,
        ),
        "routes" => print(
            &RoutesScreen::new(client, billing)
                .load(&RouteFilter::default())
                .await?,
        ),
        "subscriptions" => print(
            &SubscriptionsScreen::new(client, billing)
                .load(&SubscriptionFilter::default())
                .await?,
        ),
        "invoice" => {
            let id: InvoiceId = rest
                .first()
                .context("invoice needs an INVOICE_ID")?
                .parse()
                .context("INVOICE_ID is not a UUID")?;
            print(&InvoiceScreen::new(client, billing).load(id).await?)
        }
        "run-invoices" => {
            let run_date = match rest.first() {
                Some(raw) => parse_date(raw)?,
                None => today,
            };
            let params = BillingParams::for_range(DateRange::month_of(run_date));
            let (result, _) = BillingScreen::new(client, billing)
                .run_invoices(run_date, InvoiceRunMode::Manual, &params)
                .await?;
            print(&result)
        }
        other => bail!("Unknown command: {other}"),
    }
}

/// `[FROM TO]`, defaulting to the current month.
fn range_arg(args: &[String], today: NaiveDate) -> anyhow::Result<DateRange> {
    match args {
        [] => Ok(DateRange::month_of(today)),
        [from, to] => Ok(DateRange::new(parse_date(from)?, parse_date(to)?)?),
        _ => bail!("Expected FROM and TO dates"),
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("Invalid date: {raw}"))
}

/// Prints the snapshot a gated refresh produced, or fails with its notice.
fn show<T: Serialize>(outcome: Option<AppResult<T>>) -> anyhow::Result<()> {
    let mut state = ScreenState::new();
    if let Some(outcome) = outcome {
        state.apply(outcome);
    }
    if let Some(notice) = state.take_notice() {
        bail!("{} [{}]", notice.message, notice.code.unwrap_or("ERROR"));
    }
    match state.snapshot() {
        Some(snapshot) => print(snapshot),
        None => bail!("Load was superseded"),
    }
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
