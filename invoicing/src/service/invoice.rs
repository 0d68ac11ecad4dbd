use std::sync::Arc;
use std::time::Duration;

use crate::domain::model::{InvoiceId, NewInvoice, UserId};
use crate::domain::money::Money;
use crate::domain::repository::{InvoiceCreator, RepoError, UserFinder};
use crate::service::{with_deadline, AppError};

pub struct InvoiceService {
    user_finder: Arc<dyn UserFinder>,
    invoice_creator: Arc<dyn InvoiceCreator>,
    deadline: Duration,
}

impl InvoiceService {
    pub fn new(
        user_finder: Arc<dyn UserFinder>,
        invoice_creator: Arc<dyn InvoiceCreator>,
        deadline: Duration,
    ) -> InvoiceService {
        InvoiceService {
            user_finder,
            invoice_creator,
            deadline,
        }
    }

    /// Creates a pending invoice for an existing user. Zero and negative
    /// amounts are rejected, as are blank labels.
    pub async fn create_invoice(
        &self,
        user_id: UserId,
        amount: f64,
        label: &str,
    ) -> Result<InvoiceId, AppError> {
        with_deadline(self.deadline, self.create(user_id, amount, label)).await
    }

    async fn create(&self, user_id: UserId, amount: f64, label: &str) -> Result<InvoiceId, AppError> {
        if label.trim().is_empty() {
            return Err(AppError::validation("label must not be empty"));
        }
        let amount = Money::from_decimal(amount).map_err(|err| AppError::validation(err.to_string()))?;
        if !amount.is_positive() {
            return Err(AppError::validation("amount must be greater than zero"));
        }

        match self.user_finder.get_by_id(user_id).await {
            Ok(_) => {}
            Err(RepoError::NotFound) => {
                log::warn!(user_id = user_id; "Invoice rejected, unknown user");
                return Err(AppError::validation("user not found"));
            }
            Err(err) => return Err(AppError::storage(err, "user_finder.get_by_id")),
        }

        let invoice_id = self
            .invoice_creator
            .create(NewInvoice {
                user_id,
                label: label.to_string(),
                amount,
            })
            .await
            .map_err(|err| AppError::storage(err, "invoice_creator.create"))?;

        log::info!(invoice_id = invoice_id, user_id = user_id, amount:% = amount; "Invoice created");
        Ok(invoice_id)
    }
}
