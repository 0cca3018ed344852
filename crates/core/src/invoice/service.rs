//! Invoice line, balance and payment rules.

use routebill_shared::types::{Currency, InvoiceId, Money};
use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::status::InvoiceStatus;
use super::types::{
    Invoice, InvoiceDraft, LineDraft, NewInvoice, NewInvoiceLine, PaymentAllocation,
};

/// Service for invoice business logic.
pub struct InvoiceService;

impl InvoiceService {
    /// Validates a line before it is added to an invoice.
    ///
    /// Negative unit prices are credits, allowed as long as the invoice
    /// total stays at or above zero.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::DescriptionRequired` for a blank description.
    /// Returns `InvoiceError::QtyNotPositive` if qty is zero or negative.
    /// Returns `InvoiceError::CreditTooLarge` if the total would go negative.
    pub fn validate_line(
        invoice_id: InvoiceId,
        draft: &LineDraft,
        current_total: Decimal,
        currency: Currency,
    ) -> Result<NewInvoiceLine, InvoiceError> {
        let description = draft.description.trim();
        if description.is_empty() {
            return Err(InvoiceError::DescriptionRequired);
        }

        if draft.qty <= Decimal::ZERO {
            return Err(InvoiceError::QtyNotPositive);
        }

        let next_total = current_total + draft.qty * draft.unit_price;
        if next_total < Decimal::ZERO {
            return Err(InvoiceError::CreditTooLarge {
                would_be: Money::new(next_total, currency),
            });
        }

        Ok(NewInvoiceLine {
            invoice_id,
            description: description.to_string(),
            qty: draft.qty,
            unit_price: draft.unit_price,
        })
    }

    /// Validates an invoice form and builds the insert.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in form order.
    pub fn validate_invoice(draft: &InvoiceDraft) -> Result<NewInvoice, InvoiceError> {
        let customer_id = draft.customer_id.ok_or(InvoiceError::CustomerRequired)?;
        let (Some(period_start), Some(period_end)) = (draft.period_start, draft.period_end) else {
            return Err(InvoiceError::PeriodRequired);
        };
        if period_end < period_start {
            return Err(InvoiceError::PeriodInverted);
        }

        if let Some(line) = &draft.initial_line {
            if line.description.trim().is_empty() {
                return Err(InvoiceError::DescriptionRequired);
            }
            if line.qty <= Decimal::ZERO {
                return Err(InvoiceError::QtyNotPositive);
            }
        }

        let invoice_number = draft
            .invoice_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToString::to_string);

        Ok(NewInvoice {
            customer_id,
            subscription_id: draft.subscription_id,
            invoice_number,
            period_start,
            period_end,
            status: InvoiceStatus::Issued,
        })
    }

    /// Sum of allocations against one invoice.
    #[must_use]
    pub fn paid_amount(invoice_id: InvoiceId, allocations: &[PaymentAllocation]) -> Decimal {
        allocations
            .iter()
            .filter(|a| a.invoice_id == invoice_id)
            .map(|a| a.allocated_amount)
            .sum()
    }

    /// Outstanding balance: zero for void invoices, otherwise
    /// `total - allocated` floored at zero.
    #[must_use]
    pub fn invoice_balance(invoice: &Invoice, allocations: &[PaymentAllocation]) -> Decimal {
        if invoice.status.is_void() {
            return Decimal::ZERO;
        }
        (invoice.total_amount - Self::paid_amount(invoice.id, allocations)).max(Decimal::ZERO)
    }

    /// Validates a payment amount.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AmountNotPositive` if the amount is zero or negative.
    pub fn validate_payment(amount: Decimal) -> Result<(), InvoiceError> {
        if amount <= Decimal::ZERO {
            return Err(InvoiceError::AmountNotPositive);
        }
        Ok(())
    }

    /// Validates an allocation against the invoice's current balance.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::AmountNotPositive` if the amount is zero or negative.
    /// Returns `InvoiceError::ExceedsBalance` if it is above `outstanding`.
    pub fn validate_allocation(
        amount: Decimal,
        outstanding: Decimal,
        currency: Currency,
    ) -> Result<(), InvoiceError> {
        Self::validate_payment(amount)?;
        if amount > outstanding {
            return Err(InvoiceError::ExceedsBalance {
                amount: Money::new(amount, currency),
                outstanding: Money::new(outstanding, currency),
            });
        }
        Ok(())
    }
}
