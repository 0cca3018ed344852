//! Common types used across the application.

pub mod date_range;
pub mod id;
pub mod money;

#[cfg(test)]
mod id_tests;
#[cfg(test)]
mod money_tests;

pub use date_range::{DateRange, InvalidDateRange};
pub use id::*;
pub use money::{Currency, Money};
