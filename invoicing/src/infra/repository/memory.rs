//! In-process backend behind the same capability traits as Postgres.
//!
//! A payment unit holds the store lock from `begin` until it is closed and
//! stages its writes, so a rollback (or a drop) leaves nothing behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::model::{Invoice, InvoiceId, InvoiceStatus, NewInvoice, User, UserId};
use crate::domain::money::Money;
use crate::domain::repository::{self, PaymentUnit, RepoError, RepoResult};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    invoices: BTreeMap<InvoiceId, Invoice>,
    last_invoice_id: InvoiceId,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.state.lock().await.users.insert(user.id, user);
    }
}

#[async_trait]
impl repository::InvoiceCreator for MemoryStore {
    async fn create(&self, invoice: NewInvoice) -> RepoResult<InvoiceId> {
        let mut state = self.state.lock().await;
        if !state.users.contains_key(&invoice.user_id) {
            return Err(RepoError::Storage(anyhow!(
                "invoice references missing user {}",
                invoice.user_id
            )));
        }

        state.last_invoice_id += 1;
        let id = state.last_invoice_id;
        state.invoices.insert(
            id,
            Invoice {
                id,
                user_id: invoice.user_id,
                status: InvoiceStatus::Pending,
                label: invoice.label,
                amount: invoice.amount,
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl repository::InvoiceFinder for MemoryStore {
    async fn get_by_id(&self, id: InvoiceId) -> RepoResult<Invoice> {
        self.state
            .lock()
            .await
            .invoices
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl repository::UserFinder for MemoryStore {
    async fn get_by_id(&self, id: UserId) -> RepoResult<User> {
        self.state
            .lock()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl repository::UserLister for MemoryStore {
    async fn get_all(&self) -> RepoResult<Vec<User>> {
        Ok(self.state.lock().await.users.values().cloned().collect())
    }
}

#[async_trait]
impl repository::PaymentUnitOfWork for MemoryStore {
    async fn begin(&self) -> RepoResult<Box<dyn PaymentUnit>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryPaymentUnit {
            state: Some(guard),
            credits: Vec::new(),
            paid: Vec::new(),
        }))
    }
}

pub struct MemoryPaymentUnit {
    state: Option<OwnedMutexGuard<State>>,
    credits: Vec<(UserId, Money)>,
    paid: Vec<InvoiceId>,
}

impl MemoryPaymentUnit {
    fn open(&self) -> RepoResult<&State> {
        self.state.as_deref().ok_or_else(closed)
    }
}

fn closed() -> RepoError {
    RepoError::Storage(anyhow!("payment unit already closed"))
}

#[async_trait]
impl PaymentUnit for MemoryPaymentUnit {
    async fn modify_balance(&mut self, user_id: UserId, delta: Money) -> RepoResult<()> {
        if !self.open()?.users.contains_key(&user_id) {
            return Err(RepoError::NotFound);
        }
        self.credits.push((user_id, delta));
        Ok(())
    }

    async fn mark_as_paid(&mut self, id: InvoiceId) -> RepoResult<()> {
        let pending = self
            .open()?
            .invoices
            .get(&id)
            .is_some_and(|invoice| invoice.status == InvoiceStatus::Pending);
        if !pending || self.paid.contains(&id) {
            return Err(RepoError::NotFound);
        }
        self.paid.push(id);
        Ok(())
    }

    async fn commit(&mut self) -> RepoResult<()> {
        let mut state = self.state.take().ok_or_else(closed)?;

        let mut balances = BTreeMap::new();
        for (user_id, delta) in self.credits.drain(..) {
            let current = match balances.get(&user_id) {
                Some(balance) => *balance,
                None => state.users.get(&user_id).ok_or(RepoError::NotFound)?.balance,
            };
            let updated = current.checked_add(delta).ok_or_else(|| {
                RepoError::Storage(anyhow!("balance overflow for user {}", user_id))
            })?;
            balances.insert(user_id, updated);
        }

        for (user_id, balance) in balances {
            if let Some(user) = state.users.get_mut(&user_id) {
                user.balance = balance;
            }
        }
        for id in self.paid.drain(..) {
            if let Some(invoice) = state.invoices.get_mut(&id) {
                invoice.status = InvoiceStatus::Paid;
            }
        }
        Ok(())
    }

    async fn rollback(&mut self) -> RepoResult<()> {
        self.state.take().ok_or_else(closed)?;
        self.credits.clear();
        self.paid.clear();
        Ok(())
    }
}
