//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Hosted backend connection.
    pub backend: BackendConfig,
    /// Billing policies and console defaults.
    #[serde(default)]
    pub billing: BillingConfig,
}

/// Hosted backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted project (e.g. `https://xyz.supabase.co`).
    pub url: String,
    /// API key sent as `apikey` and as the bearer token.
    pub api_key: String,
    /// Database schema exposed through the REST API.
    #[serde(default = "default_schema")]
    pub schema: String,
    /// Request timeout. `None` keeps the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_schema() -> String {
    "public".to_string()
}

/// Billing policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// ISO 4217 code used for display.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Whether an explicit zero price override means "free".
    ///
    /// When false, a zero override falls back to the route price.
    #[serde(default = "default_true")]
    pub zero_override_is_free: bool,
    /// Refuse to inactivate customers that still have non-void invoices.
    #[serde(default = "default_true")]
    pub block_inactivation_with_invoices: bool,
    /// Ranges longer than this many days are bucketed by month.
    #[serde(default = "default_bucket_threshold_days")]
    pub bucket_threshold_days: i64,
    /// Rows shown in overview tables.
    #[serde(default = "default_top_rows")]
    pub top_rows: usize,
    /// Row limit for list queries.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_currency() -> String {
    "ZAR".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_bucket_threshold_days() -> i64 {
    45
}

const fn default_top_rows() -> usize {
    8
}

const fn default_list_limit() -> usize {
    5000
}

impl BillingConfig {
    /// Display currency, falling back to the default for unknown codes.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency.parse().unwrap_or_default()
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            zero_override_is_free: default_true(),
            block_inactivation_with_invoices: default_true(),
            bucket_threshold_days: default_bucket_threshold_days(),
            top_rows: default_top_rows(),
            list_limit: default_list_limit(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("ROUTEBILL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
