//! Customers.

pub mod error;
pub mod service;
pub mod types;


pub use error::CustomerError;
pub use service::CustomerService;
pub use types::{
    Customer, CustomerCounts, CustomerCredit, CustomerDraft, CustomerFilter, CustomerStatus,
    CustomerType, NewCustomer,
};
