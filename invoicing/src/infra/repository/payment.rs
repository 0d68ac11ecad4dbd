use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use crate::domain::model::{InvoiceId, UserId};
use crate::domain::money::Money;
use crate::domain::repository::{self, PaymentUnit, RepoError, RepoResult};
use crate::infra::repository::invoice::PgInvoiceRepository;
use crate::infra::repository::user::PgUserRepository;

#[derive(Clone)]
pub struct PgPaymentUnitOfWork {
    pub pool: Pool<Postgres>,
}

impl PgPaymentUnitOfWork {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgPaymentUnitOfWork { pool }
    }
}

#[async_trait]
impl repository::PaymentUnitOfWork for PgPaymentUnitOfWork {
    async fn begin(&self) -> RepoResult<Box<dyn PaymentUnit>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPaymentUnit { tx: Some(tx) }))
    }
}

/// One database transaction over both tables. sqlx rolls the transaction
/// back if the unit is dropped while still open.
pub struct PgPaymentUnit {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgPaymentUnit {
    fn open(&mut self) -> RepoResult<&mut Transaction<'static, Postgres>> {
        self.tx.as_mut().ok_or_else(closed)
    }
}

fn closed() -> RepoError {
    RepoError::Storage(anyhow!("payment unit already closed"))
}

#[async_trait]
impl PaymentUnit for PgPaymentUnit {
    async fn modify_balance(&mut self, user_id: UserId, delta: Money) -> RepoResult<()> {
        let tx = self.open()?;
        PgUserRepository::modify_balance(&mut **tx, user_id, delta).await
    }

    async fn mark_as_paid(&mut self, id: InvoiceId) -> RepoResult<()> {
        let tx = self.open()?;
        PgInvoiceRepository::mark_as_paid(&mut **tx, id).await
    }

    async fn commit(&mut self) -> RepoResult<()> {
        let tx = self.tx.take().ok_or_else(closed)?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(&mut self) -> RepoResult<()> {
        let tx = self.tx.take().ok_or_else(closed)?;
        tx.rollback().await?;
        Ok(())
    }
}
