//! Customer repository.

use std::sync::Arc;

use routebill_core::customer::{Customer, CustomerStatus, NewCustomer};
use routebill_shared::types::CustomerId;
use serde_json::json;

use super::{fetch, fetch_one, insert, update};
use crate::client::{DataClient, Filter, Query};
use crate::error::DataError;

const TABLE: &str = "customers";

/// Repository for the `customers` table.
#[derive(Clone)]
pub struct CustomerRepository {
    client: Arc<dyn DataClient>,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Lists customers by name, optionally restricted to one status.
    pub async fn list(
        &self,
        status: Option<CustomerStatus>,
        limit: usize,
    ) -> Result<Vec<Customer>, DataError> {
        let mut query = Query::table(TABLE).order("display_name", true).limit(limit);
        if let Some(status) = status {
            query = query.eq("status", status);
        }
        fetch(self.client.as_ref(), &query).await
    }

    /// Loads one customer.
    pub async fn get(&self, id: CustomerId) -> Result<Customer, DataError> {
        fetch_one(
            self.client.as_ref(),
            Query::table(TABLE).eq("customer_id", id),
            "Customer",
        )
        .await
    }

    /// Loads the customers with the given IDs.
    pub async fn by_ids(&self, ids: &[CustomerId]) -> Result<Vec<Customer>, DataError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::table(TABLE).in_list("customer_id", ids.iter().copied());
        fetch(self.client.as_ref(), &query).await
    }

    /// Counts active customers.
    pub async fn count_active(&self) -> Result<u64, DataError> {
        self.client
            .count(
                &Query::table(TABLE)
                    .select("customer_id")
                    .eq("status", CustomerStatus::Active),
            )
            .await
    }

    /// Inserts a customer.
    pub async fn insert(&self, customer: &NewCustomer) -> Result<Customer, DataError> {
        insert(self.client.as_ref(), TABLE, customer).await
    }

    /// Sets a customer's status.
    pub async fn set_status(
        &self,
        id: CustomerId,
        status: CustomerStatus,
    ) -> Result<Customer, DataError> {
        update(
            self.client.as_ref(),
            TABLE,
            vec![Filter::eq("customer_id", id)],
            &json!({ "status": status }),
            None,
            "Customer",
        )
        .await
    }
}
