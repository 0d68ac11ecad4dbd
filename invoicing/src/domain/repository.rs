//! Storage capabilities.
//!
//! Each workflow depends only on the traits it needs: invoice creation sees
//! [`InvoiceCreator`] and [`UserFinder`], payment sees [`InvoiceFinder`] and
//! [`PaymentUnitOfWork`], the user listing sees [`UserLister`].

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::domain::model::{Invoice, InvoiceId, NewInvoice, User, UserId};
use crate::domain::money::Money;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            err => RepoError::Storage(err.into()),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InvoiceCreator: Send + Sync {
    /// Stores a pending invoice and returns its assigned id.
    async fn create(&self, invoice: NewInvoice) -> RepoResult<InvoiceId>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InvoiceFinder: Send + Sync {
    async fn get_by_id(&self, id: InvoiceId) -> RepoResult<Invoice>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserFinder: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> RepoResult<User>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserLister: Send + Sync {
    async fn get_all(&self) -> RepoResult<Vec<User>>;
}

/// Opens units of work that span the invoice and user stores.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentUnitOfWork: Send + Sync {
    async fn begin(&self) -> RepoResult<Box<dyn PaymentUnit>>;
}

/// Writes staged inside one atomic unit. Nothing is visible to other
/// readers until [`PaymentUnit::commit`]; a unit dropped without commit is
/// rolled back.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentUnit: Send {
    /// Adds `delta` to the stored balance in a single read-modify-write.
    async fn modify_balance(&mut self, user_id: UserId, delta: Money) -> RepoResult<()>;

    /// Moves a pending invoice to paid. Fails with [`RepoError::NotFound`]
    /// unless exactly one pending invoice with this id changed.
    async fn mark_as_paid(&mut self, id: InvoiceId) -> RepoResult<()>;

    async fn commit(&mut self) -> RepoResult<()>;

    async fn rollback(&mut self) -> RepoResult<()>;
}
