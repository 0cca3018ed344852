//! Routes, route rollups and subscription mix.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::RouteError;
pub use service::RouteService;
pub use types::{
    NewRoute, Route, RouteCounts, RouteDraft, RouteFilter, RouteRollup, RouteView,
    SubscriptionMix,
};
