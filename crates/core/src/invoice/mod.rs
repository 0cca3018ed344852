//! Invoices, invoice lines, payments and allocations.

pub mod error;
pub mod service;
pub mod status;
pub mod types;


pub use error::InvoiceError;
pub use service::InvoiceService;
pub use status::{InvoiceStatus, OUTSTANDING_EPSILON, StatusTone};
pub use types::{
    Invoice, InvoiceDraft, InvoiceLine, InvoiceStatusFilter, LineDraft, NewAllocation, NewInvoice,
    NewInvoiceLine, NewPayment, Payment, PaymentAllocation,
};
