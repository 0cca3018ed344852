//! Named backend procedures.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::client::DataClient;
use crate::error::DataError;

/// Who triggered an invoice run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceRunMode {
    /// Started by an operator.
    Manual,
    /// Started by a schedule.
    Scheduled,
}

/// What an invoice run did. Runs are idempotent on the backend, so a repeat
/// run for the same date reports everything as skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRunResult {
    /// Invoices created.
    #[serde(default, alias = "created_count")]
    pub created: u64,
    /// Subscriptions skipped because an invoice already exists.
    #[serde(default, alias = "skipped_count")]
    pub skipped: u64,
}

/// Typed wrappers over the backend's stored procedures.
#[derive(Clone)]
pub struct Procedures {
    client: Arc<dyn DataClient>,
}

impl Procedures {
    /// Creates the procedure wrapper.
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    /// Raises invoices for every subscription due on `run_date`.
    pub async fn generate_due_invoices(
        &self,
        run_date: NaiveDate,
        mode: InvoiceRunMode,
    ) -> Result<InvoiceRunResult, DataError> {
        let value = self
            .client
            .call(
                "generate_due_invoices",
                json!({ "p_run_date": run_date, "p_mode": mode }),
            )
            .await?;

        // Set-returning functions come back as a one-row array.
        let value = match value {
            Value::Array(mut rows) if rows.len() == 1 => rows.remove(0),
            Value::Array(rows) if rows.is_empty() => Value::Null,
            other => other,
        };
        let result = if value.is_null() {
            InvoiceRunResult::default()
        } else {
            serde_json::from_value(value)?
        };

        info!(
            %run_date,
            ?mode,
            created = result.created,
            skipped = result.skipped,
            "Invoice run complete"
        );
        Ok(result)
    }

    /// Allocates the next invoice number.
    ///
    /// # Errors
    ///
    /// Fails when the backend returns a blank number.
    pub async fn next_invoice_number(&self) -> Result<String, DataError> {
        let value = self.client.call("next_invoice_number", json!({})).await?;
        let number = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        if number.is_empty() {
            return Err(DataError::backend(500, "Could not generate invoice number."));
        }
        debug!(%number, "Allocated invoice number");
        Ok(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryClient;

    fn procedures(client: &InMemoryClient) -> Procedures {
        Procedures::new(Arc::new(client.clone()))
    }

    #[tokio::test]
    async fn test_invoice_run_accepts_object_or_single_row() {
        let client = InMemoryClient::new();
        client.register_procedure("generate_due_invoices", |_, args| {
            assert_eq!(args["p_mode"], "manual");
            assert_eq!(args["p_run_date"], "2024-06-03");
            Ok(json!([{ "created_count": 3, "skipped_count": 1 }]))
        });

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let result = procedures(&client)
            .generate_due_invoices(date, InvoiceRunMode::Manual)
            .await
            .unwrap();
        assert_eq!(result, InvoiceRunResult { created: 3, skipped: 1 });

        client.register_procedure("generate_due_invoices", |_, _| {
            Ok(json!({ "created": 0, "skipped": 4 }))
        });
        let result = procedures(&client)
            .generate_due_invoices(date, InvoiceRunMode::Scheduled)
            .await
            .unwrap();
        assert_eq!(result.skipped, 4);
    }

    #[tokio::test]
    async fn test_blank_invoice_number_is_an_error() {
        let client = InMemoryClient::new();
        client.register_procedure("next_invoice_number", |_, _| Ok(json!("  ")));

        let err = procedures(&client).next_invoice_number().await.unwrap_err();
        assert_eq!(err.to_string(), "Could not generate invoice number.");

        client.register_procedure("next_invoice_number", |_, _| Ok(json!(" INV-0042 ")));
        let number = procedures(&client).next_invoice_number().await.unwrap();
        assert_eq!(number, "INV-0042");
    }

    #[tokio::test]
    async fn test_missing_procedure() {
        let client = InMemoryClient::new();
        let err = procedures(&client).next_invoice_number().await.unwrap_err();
        assert!(matches!(err, DataError::UnknownProcedure(_)));
    }
}
