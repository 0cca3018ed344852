//! Trend bucket keys.

use chrono::NaiveDate;
use routebill_shared::types::DateRange;

use super::types::BucketMode;

impl BucketMode {
    /// Month buckets when the range spans more than `threshold_days`
    /// (`to - from`), week buckets otherwise.
    #[must_use]
    pub fn for_range(range: &DateRange, threshold_days: i64) -> Self {
        if range.span_days() > threshold_days {
            Self::Month
        } else {
            Self::Week
        }
    }

    /// First day of the bucket containing `date`.
    #[must_use]
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Week => DateRange::week_of(date).from(),
            Self::Month => DateRange::month_of(date).from(),
        }
    }

    /// Key of the bucket containing `date`.
    #[must_use]
    pub fn key(self, date: NaiveDate) -> String {
        let start = self.bucket_start(date);
        match self {
            Self::Week => start.format("%Y-%m-%d").to_string(),
            Self::Month => start.format("%Y-%m").to_string(),
        }
    }
}
