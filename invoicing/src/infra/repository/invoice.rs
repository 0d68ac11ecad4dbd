use async_trait::async_trait;
use sqlx::{PgExecutor, Pool, Postgres, Row};

use crate::domain::model::{Invoice, InvoiceId, InvoiceStatus, NewInvoice};
use crate::domain::repository::{self, RepoError, RepoResult};

#[derive(Clone)]
pub struct PgInvoiceRepository {
    pub pool: Pool<Postgres>,
}

impl PgInvoiceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgInvoiceRepository { pool }
    }

    /// Conditional `pending -> paid` update. Zero affected rows covers both a
    /// missing invoice and one already paid by a concurrent call.
    pub async fn mark_as_paid<'e, E>(executor: E, id: InvoiceId) -> RepoResult<()>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE invoices SET status = $1 WHERE id = $2 AND status = $3")
            .bind(InvoiceStatus::Paid.as_str())
            .bind(id)
            .bind(InvoiceStatus::Pending.as_str())
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl repository::InvoiceCreator for PgInvoiceRepository {
    async fn create(&self, invoice: NewInvoice) -> RepoResult<InvoiceId> {
        let row = sqlx::query(
            "INSERT INTO invoices(user_id, status, label, amount) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(invoice.user_id)
        .bind(InvoiceStatus::Pending.as_str())
        .bind(&invoice.label)
        .bind(invoice.amount.minor_units())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| RepoError::Storage(err.into()))?;

        Ok(row.try_get("id")?)
    }
}

#[async_trait]
impl repository::InvoiceFinder for PgInvoiceRepository {
    async fn get_by_id(&self, id: InvoiceId) -> RepoResult<Invoice> {
        let row = sqlx::query("SELECT id, user_id, status, label, amount FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Invoice::try_from(row)?)
    }
}
