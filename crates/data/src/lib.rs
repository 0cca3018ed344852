//! Data access for Routebill.
//!
//! This crate provides:
//! - The `DataClient` boundary with a REST implementation and an in-memory fake
//! - Typed repositories over the backend's tables and views
//! - Named backend procedures
//! - Screen services that load snapshots and run guarded mutations

pub mod client;
pub mod error;
pub mod procedures;
pub mod repositories;
pub mod services;

pub use client::{DataClient, Filter, InMemoryClient, Query, RestClient, Row};
pub use error::DataError;
pub use procedures::{InvoiceRunMode, InvoiceRunResult, Procedures};
