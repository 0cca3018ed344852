//! Core business logic for Routebill.
//!
//! This crate contains pure business logic with ZERO network or database dependencies.
//! Rows come in already fetched; every function here is a calculation or a check.
//!
//! # Modules
//!
//! - `pricing` - Effective-dated route price resolution
//! - `subscription` - Subscription validation and expected value
//! - `invoice` - Invoice status, lines, balances and payments
//! - `customer` - Customer validation and inactivation policy
//! - `route` - Route validation and per-route rollups
//! - `reports` - Period summaries and trend buckets

pub mod customer;
pub mod invoice;
pub mod pricing;
pub mod reports;
pub mod route;
pub mod subscription;
