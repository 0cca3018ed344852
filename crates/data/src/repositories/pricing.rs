//! Route pricing repository.

use std::sync::Arc;

use chrono::NaiveDate;
use routebill_core::pricing::{NewRoutePricing, RoutePricing};
use routebill_shared::types::{PricingId, RouteId};

use super::{fetch, insert};
use crate::client::{DataClient, Filter, Op, Query};
use crate::error::DataError;

const TABLE: &str = "route_pricing";

/// Repository for the `route_pricing` table.
#[derive(Clone)]
pub struct PricingRepository {
    client: Arc<dyn DataClient>,
}

impl PricingRepository {
    /// Creates a new pricing repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Pricing history of one route, latest first.
    pub async fn for_route(&self, route_id: RouteId) -> Result<Vec<RoutePricing>, DataError> {
        let query = Query::table(TABLE)
            .eq("route_id", route_id)
            .order("effective_from", false);
        fetch(self.client.as_ref(), &query).await
    }

    /// Rows of every route that cover `as_of`.
    pub async fn covering(&self, as_of: NaiveDate) -> Result<Vec<RoutePricing>, DataError> {
        let query = Query::table(TABLE)
            .lte("effective_from", as_of)
            .or(vec![
                Filter::is_null("effective_to"),
                Filter::compare("effective_to", Op::Gte, as_of),
            ])
            .order("effective_from", false);
        fetch(self.client.as_ref(), &query).await
    }

    /// Every pricing row.
    pub async fn all(&self, limit: usize) -> Result<Vec<RoutePricing>, DataError> {
        let query = Query::table(TABLE)
            .order("effective_from", false)
            .limit(limit);
        fetch(self.client.as_ref(), &query).await
    }

    /// Inserts a pricing row.
    pub async fn insert(&self, pricing: &NewRoutePricing) -> Result<RoutePricing, DataError> {
        insert(self.client.as_ref(), TABLE, pricing).await
    }

    /// Deletes a pricing row.
    pub async fn delete(&self, id: PricingId) -> Result<(), DataError> {
        let removed = self
            .client
            .delete(TABLE, &[Filter::eq("pricing_id", id)])
            .await?;
        if removed == 0 {
            return Err(DataError::NotFound("Pricing".to_string()));
        }
        Ok(())
    }
}
