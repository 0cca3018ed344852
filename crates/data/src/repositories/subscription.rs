//! Subscription repository.

use std::sync::Arc;

use routebill_core::pricing::BillingPeriod;
use routebill_core::subscription::{NewSubscription, Subscription, SubscriptionStatus};
use routebill_shared::types::{CustomerId, RouteId, SubscriptionId};
use serde_json::json;

use super::{fetch, fetch_one, insert, update};
use crate::client::{DataClient, Filter, Query};
use crate::error::DataError;

const TABLE: &str = "subscriptions";

/// Repository for the `subscriptions` table.
#[derive(Clone)]
pub struct SubscriptionRepository {
    client: Arc<dyn DataClient>,
}

impl SubscriptionRepository {
    /// Creates a new subscription repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Lists subscriptions, newest first.
    pub async fn list(
        &self,
        status: Option<SubscriptionStatus>,
        billing_period: Option<BillingPeriod>,
        limit: usize,
    ) -> Result<Vec<Subscription>, DataError> {
        let mut query = Query::table(TABLE).order("created_at", false).limit(limit);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        if let Some(period) = billing_period {
            query = query.eq("billing_period", period);
        }
        fetch(self.client.as_ref(), &query).await
    }

    /// Loads one subscription.
    pub async fn get(&self, id: SubscriptionId) -> Result<Subscription, DataError> {
        fetch_one(
            self.client.as_ref(),
            Query::table(TABLE).eq("subscription_id", id),
            "Subscription",
        )
        .await
    }

    /// Subscriptions held by one customer.
    pub async fn for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Subscription>, DataError> {
        let query = Query::table(TABLE)
            .eq("customer_id", customer_id)
            .order("created_at", false);
        fetch(self.client.as_ref(), &query).await
    }

    /// Subscriptions on one route.
    pub async fn for_route(&self, route_id: RouteId) -> Result<Vec<Subscription>, DataError> {
        let query = Query::table(TABLE)
            .eq("route_id", route_id)
            .order("created_at", false);
        fetch(self.client.as_ref(), &query).await
    }

    /// Every active subscription.
    pub async fn active(&self, limit: usize) -> Result<Vec<Subscription>, DataError> {
        let query = Query::table(TABLE)
            .eq("status", SubscriptionStatus::Active)
            .limit(limit);
        fetch(self.client.as_ref(), &query).await
    }

    /// Counts active subscriptions.
    pub async fn count_active(&self) -> Result<u64, DataError> {
        self.client
            .count(
                &Query::table(TABLE)
                    .select("subscription_id")
                    .eq("status", SubscriptionStatus::Active),
            )
            .await
    }

    /// Inserts a subscription.
    pub async fn insert(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, DataError> {
        insert(self.client.as_ref(), TABLE, subscription).await
    }

    /// Sets a subscription's status.
    pub async fn set_status(
        &self,
        id: SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<Subscription, DataError> {
        update(
            self.client.as_ref(),
            TABLE,
            vec![Filter::eq("subscription_id", id)],
            &json!({ "status": status }),
            None,
            "Subscription",
        )
        .await
    }
}
