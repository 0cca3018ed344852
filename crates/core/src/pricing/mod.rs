//! Route pricing and effective-dated price resolution.

pub mod error;
pub mod service;
pub mod types;


pub use error::PricingError;
pub use service::PricingService;
pub use types::{
    BillingPeriod, CurrentPrices, NewRoutePricing, PriceResolution, PricingOverlap, RoutePricing,
};
