//! Invoice status as reported by the backend.
//!
//! The backend owns the status machine. These helpers only describe it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balances at or below this are treated as settled.
pub const OUTSTANDING_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Issued, nothing paid yet.
    Issued,
    /// Some payments allocated.
    PartiallyPaid,
    /// Fully paid.
    Paid,
    /// Past due.
    Overdue,
    /// Cancelled. Terminal and excluded from every total.
    Void,
}

/// Badge colour for an invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    /// Settled.
    Green,
    /// Partly settled.
    Amber,
    /// Needs attention.
    Red,
    /// Nothing to do.
    Muted,
}

impl InvoiceStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Issued,
        Self::PartiallyPaid,
        Self::Paid,
        Self::Overdue,
        Self::Void,
    ];

    /// Returns the string representation used by the backend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Void => "void",
        }
    }

    /// Parses a backend status string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Returns true for void invoices.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Returns true if moving to `next` follows the usual lifecycle.
    ///
    /// Advisory only: operators may correct a status by hand, and an
    /// unexpected move is logged rather than refused.
    #[must_use]
    pub const fn is_expected_transition(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Issued, Self::PartiallyPaid | Self::Paid | Self::Overdue)
                | (Self::PartiallyPaid | Self::Overdue, Self::Paid | Self::PartiallyPaid)
                | (Self::Issued | Self::PartiallyPaid | Self::Paid | Self::Overdue, Self::Void)
        )
    }

    /// Badge text, e.g. `ISSUED • DUE` while a balance remains.
    #[must_use]
    pub fn label(&self, outstanding: Decimal) -> String {
        let upper = self.as_str().to_uppercase();
        if outstanding > OUTSTANDING_EPSILON && *self != Self::Paid {
            format!("{upper} • DUE")
        } else {
            upper
        }
    }

    /// Badge colour given the outstanding balance.
    #[must_use]
    pub fn tone(&self, outstanding: Decimal) -> StatusTone {
        match self {
            Self::Paid => StatusTone::Green,
            Self::Overdue => StatusTone::Red,
            Self::PartiallyPaid => StatusTone::Amber,
            Self::Issued | Self::Void if outstanding > OUTSTANDING_EPSILON => StatusTone::Red,
            Self::Issued | Self::Void => StatusTone::Muted,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown invoice status: {s}"))
    }
}
