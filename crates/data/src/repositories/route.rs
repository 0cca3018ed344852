//! Route repository.

use std::sync::Arc;

use routebill_core::route::{NewRoute, Route};
use routebill_shared::types::RouteId;
use serde_json::json;

use super::{fetch, fetch_one, insert, update};
use crate::client::{DataClient, Filter, Query};
use crate::error::DataError;

const TABLE: &str = "routes";

/// Repository for the `routes` table.
#[derive(Clone)]
pub struct RouteRepository {
    client: Arc<dyn DataClient>,
}

impl RouteRepository {
    /// Creates a new route repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Lists routes, newest first.
    pub async fn list(&self, limit: usize) -> Result<Vec<Route>, DataError> {
        let query = Query::table(TABLE).order("created_at", false).limit(limit);
        fetch(self.client.as_ref(), &query).await
    }

    /// Loads one route.
    pub async fn get(&self, id: RouteId) -> Result<Route, DataError> {
        fetch_one(
            self.client.as_ref(),
            Query::table(TABLE).eq("route_id", id),
            "Route",
        )
        .await
    }

    /// Counts active routes.
    pub async fn count_active(&self) -> Result<u64, DataError> {
        self.client
            .count(&Query::table(TABLE).select("route_id").eq("is_active", true))
            .await
    }

    /// Inserts a route.
    pub async fn insert(&self, route: &NewRoute) -> Result<Route, DataError> {
        insert(self.client.as_ref(), TABLE, route).await
    }

    /// Replaces a route's editable fields.
    pub async fn update(&self, id: RouteId, route: &NewRoute) -> Result<Route, DataError> {
        update(
            self.client.as_ref(),
            TABLE,
            vec![Filter::eq("route_id", id)],
            route,
            None,
            "Route",
        )
        .await
    }

    /// Activates or deactivates a route.
    pub async fn set_active(&self, id: RouteId, is_active: bool) -> Result<Route, DataError> {
        update(
            self.client.as_ref(),
            TABLE,
            vec![Filter::eq("route_id", id)],
            &json!({ "is_active": is_active }),
            None,
            "Route",
        )
        .await
    }
}
