use std::sync::Arc;
use std::time::Duration;

use crate::domain::model::{InvoiceId, InvoiceStatus};
use crate::domain::money::Money;
use crate::domain::repository::{InvoiceFinder, PaymentUnit, PaymentUnitOfWork, RepoError};
use crate::service::{with_deadline, AppError};

pub struct PaymentService {
    invoice_finder: Arc<dyn InvoiceFinder>,
    payments: Arc<dyn PaymentUnitOfWork>,
    deadline: Duration,
}

impl PaymentService {
    pub fn new(
        invoice_finder: Arc<dyn InvoiceFinder>,
        payments: Arc<dyn PaymentUnitOfWork>,
        deadline: Duration,
    ) -> PaymentService {
        PaymentService {
            invoice_finder,
            payments,
            deadline,
        }
    }

    /// Pays an invoice in full: credits the owner's balance and marks the
    /// invoice paid inside one unit of work.
    ///
    /// `amount` must equal the recorded invoice amount to the cent. A repeat
    /// of a successful call fails with [`AppError::AlreadyPaid`], and so does
    /// the loser of two concurrent calls, since the conditional
    /// `pending -> paid` update is what decides the winner.
    pub async fn process_transaction(
        &self,
        invoice_id: InvoiceId,
        amount: f64,
        reference: &str,
    ) -> Result<(), AppError> {
        with_deadline(self.deadline, self.pay(invoice_id, amount, reference)).await
    }

    async fn pay(&self, invoice_id: InvoiceId, amount: f64, reference: &str) -> Result<(), AppError> {
        let invoice = match self.invoice_finder.get_by_id(invoice_id).await {
            Ok(invoice) => invoice,
            Err(RepoError::NotFound) => return Err(AppError::InvoiceNotFound),
            Err(err) => return Err(AppError::storage(err, "invoice_finder.get_by_id")),
        };

        // An amount that cannot be expressed in cents never matches.
        let paid = Money::from_decimal(amount).map_err(|_| AppError::AmountMismatch)?;
        if paid != invoice.amount {
            log::warn!(invoice_id = invoice_id, expected:% = invoice.amount, got:% = paid; "Payment amount mismatch");
            return Err(AppError::AmountMismatch);
        }
        if invoice.status == InvoiceStatus::Paid {
            return Err(AppError::AlreadyPaid);
        }

        let mut unit = self
            .payments
            .begin()
            .await
            .map_err(|err| AppError::storage(err, "payments.begin"))?;

        if let Err(err) = unit.modify_balance(invoice.user_id, invoice.amount).await {
            abandon(unit.as_mut(), invoice_id).await;
            return Err(AppError::storage(err, "payment_unit.modify_balance"));
        }

        match unit.mark_as_paid(invoice.id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => {
                abandon(unit.as_mut(), invoice_id).await;
                log::info!(invoice_id = invoice_id; "Invoice paid by a concurrent transaction");
                return Err(AppError::AlreadyPaid);
            }
            Err(err) => {
                abandon(unit.as_mut(), invoice_id).await;
                return Err(AppError::storage(err, "payment_unit.mark_as_paid"));
            }
        }

        unit.commit()
            .await
            .map_err(|err| AppError::storage(err, "payment_unit.commit"))?;

        log::info!(
            invoice_id = invoice_id,
            user_id = invoice.user_id,
            amount:% = invoice.amount,
            reference = reference;
            "Invoice paid"
        );
        Ok(())
    }
}

async fn abandon(unit: &mut dyn PaymentUnit, invoice_id: InvoiceId) {
    if let Err(err) = unit.rollback().await {
        log::error!(invoice_id = invoice_id, error:% = err; "Payment rollback failed");
    }
}
