//! Typed repositories over the backend's tables and views.
//!
//! Repositories provide a typed interface over [`DataClient`], hiding table
//! names, column names and row decoding from the screen services.

pub mod customer;
pub mod invoice;
pub mod payment;
pub mod pricing;
pub mod route;
pub mod subscription;
pub mod views;

pub use customer::CustomerRepository;
pub use invoice::InvoiceRepository;
pub use payment::PaymentRepository;
pub use pricing::PricingRepository;
pub use route::RouteRepository;
pub use subscription::SubscriptionRepository;
pub use views::ViewRepository;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::{DataClient, Filter, Query, decode_row, decode_rows, encode_row};
use crate::error::DataError;

async fn fetch<T: DeserializeOwned>(
    client: &dyn DataClient,
    query: &Query,
) -> Result<Vec<T>, DataError> {
    decode_rows(client.select(query).await?)
}

async fn fetch_one<T: DeserializeOwned>(
    client: &dyn DataClient,
    query: Query,
    what: &str,
) -> Result<T, DataError> {
    let row = client
        .select(&query.limit(1))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| DataError::NotFound(what.to_string()))?;
    decode_row(row)
}

async fn insert<T: Serialize, R: DeserializeOwned>(
    client: &dyn DataClient,
    table: &str,
    value: &T,
) -> Result<R, DataError> {
    decode_row(client.insert(table, encode_row(value)?).await?)
}

/// Applies `patch` to the rows matching `filters`.
///
/// With `expected_version`, the update is conditional on the row's
/// `updated_at` and matching nothing is a stale write. Without it,
/// matching nothing means the row is gone.
async fn update<T: Serialize, R: DeserializeOwned>(
    client: &dyn DataClient,
    table: &str,
    mut filters: Vec<Filter>,
    patch: &T,
    expected_version: Option<chrono::DateTime<chrono::Utc>>,
    what: &str,
) -> Result<R, DataError> {
    if let Some(version) = expected_version {
        filters.push(Filter::eq("updated_at", version));
    }
    let row = client
        .update(table, &filters, encode_row(patch)?)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            if expected_version.is_some() {
                DataError::StaleWrite
            } else {
                DataError::NotFound(what.to_string())
            }
        })?;
    decode_row(row)
}
