//! Shared types, errors, and configuration for Routebill.
//!
//! This crate provides common types used across all other crates:
//! - Money formatting with decimal precision
//! - Typed IDs for type-safe entity references
//! - Inclusive business date ranges
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;


pub use config::{AppConfig, BackendConfig, BillingConfig};
pub use error::{AppError, AppResult};
