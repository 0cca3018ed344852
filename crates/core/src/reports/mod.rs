//! Billing period summaries and trend buckets.

pub mod bucket;
pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::{BucketMode, PendingSendRow, PeriodSummary, ReceivableRow, TrendBucket};
