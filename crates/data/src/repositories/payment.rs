//! Payment repository.

use std::sync::Arc;

use routebill_core::invoice::{NewAllocation, NewPayment, Payment, PaymentAllocation};
use routebill_shared::types::{InvoiceId, PaymentId};

use super::{fetch, insert};
use crate::client::{DataClient, Filter, Query};
use crate::error::DataError;

/// Repository for the `payments` and `payment_allocations` tables.
#[derive(Clone)]
pub struct PaymentRepository {
    client: Arc<dyn DataClient>,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Allocations made against one invoice.
    pub async fn allocations_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<PaymentAllocation>, DataError> {
        let query = Query::table("payment_allocations").eq("invoice_id", invoice_id);
        fetch(self.client.as_ref(), &query).await
    }

    /// Records a payment.
    pub async fn insert_payment(&self, payment: &NewPayment) -> Result<Payment, DataError> {
        insert(self.client.as_ref(), "payments", payment).await
    }

    /// Allocates part of a payment to an invoice.
    pub async fn insert_allocation(
        &self,
        allocation: &NewAllocation,
    ) -> Result<PaymentAllocation, DataError> {
        insert(self.client.as_ref(), "payment_allocations", allocation).await
    }

    /// Removes a payment that never received its allocation.
    pub async fn delete_payment(&self, id: PaymentId) -> Result<(), DataError> {
        let removed = self
            .client
            .delete("payments", &[Filter::eq("payment_id", id)])
            .await?;
        if removed == 0 {
            return Err(DataError::NotFound("Payment".to_string()));
        }
        Ok(())
    }
}
