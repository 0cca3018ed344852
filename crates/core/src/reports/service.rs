//! Period aggregation over fetched invoices and receivables.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use routebill_shared::types::{DateRange, InvoiceId};
use rust_decimal::Decimal;

use super::types::{BucketMode, PendingSendRow, PeriodSummary, ReceivableRow, TrendBucket};
use crate::invoice::{Invoice, InvoiceStatus};

/// Service for billing period summaries.
pub struct ReportService;

impl ReportService {
    /// Summarises invoices, receivables and pending sends over `range`.
    ///
    /// Invoices and receivables are filtered here (non-void, period_start in
    /// range), so callers may pass wider sets. Pending sends are taken as
    /// given. Pure: the same input always gives the same summary.
    #[must_use]
    pub fn aggregate(
        invoices: &[Invoice],
        receivables: &[ReceivableRow],
        pending_sends: &[PendingSendRow],
        range: DateRange,
        bucket_threshold_days: i64,
    ) -> PeriodSummary {
        let in_range: Vec<&Invoice> = invoices
            .iter()
            .filter(|i| !i.status.is_void() && range.contains(i.period_start))
            .collect();
        let window: Vec<&ReceivableRow> = receivables
            .iter()
            .filter(|r| range.contains(r.period_start))
            .collect();

        let balance_of: HashMap<InvoiceId, Decimal> = receivables
            .iter()
            .map(|r| (r.invoice_id, r.balance_amount))
            .collect();

        let invoiced_total: Decimal = in_range.iter().map(|i| i.total_amount).sum();
        let paid_total: Decimal = in_range
            .iter()
            .map(|i| {
                let outstanding = balance_of.get(&i.id).copied().unwrap_or_default();
                (i.total_amount - outstanding).max(Decimal::ZERO)
            })
            .sum();
        let due_total: Decimal = window.iter().map(|r| r.balance_amount).sum();

        let bucket_mode = BucketMode::for_range(&range, bucket_threshold_days);
        let buckets = Self::buckets(&in_range, &window, bucket_mode);

        PeriodSummary {
            range,
            invoiced_total,
            paid_total,
            due_total,
            pending_total: pending_sends.iter().map(|p| p.balance_amount).sum(),
            pending_count: pending_sends.len(),
            bucket_mode,
            buckets,
        }
    }

    fn buckets(
        invoices: &[&Invoice],
        receivables: &[&ReceivableRow],
        mode: BucketMode,
    ) -> Vec<TrendBucket> {
        let mut buckets: BTreeMap<NaiveDate, TrendBucket> = BTreeMap::new();

        for invoice in invoices {
            let bucket = Self::bucket_for(&mut buckets, mode, invoice.period_start);
            bucket.issued += invoice.total_amount;
            if invoice.status == InvoiceStatus::Paid {
                bucket.paid += invoice.total_amount;
            }
        }
        for row in receivables {
            Self::bucket_for(&mut buckets, mode, row.period_start).due += row.balance_amount;
        }

        buckets.into_values().collect()
    }

    fn bucket_for(
        buckets: &mut BTreeMap<NaiveDate, TrendBucket>,
        mode: BucketMode,
        date: NaiveDate,
    ) -> &mut TrendBucket {
        let start = mode.bucket_start(date);
        buckets
            .entry(start)
            .or_insert_with(|| TrendBucket::empty(mode.key(date), start))
    }
}
