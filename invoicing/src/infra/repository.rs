pub mod invoice;
pub mod memory;
pub mod payment;
pub mod user;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::domain::repository::{
    InvoiceCreator, InvoiceFinder, PaymentUnitOfWork, UserFinder, UserLister,
};
use crate::infra::repository::invoice::PgInvoiceRepository;
use crate::infra::repository::memory::MemoryStore;
use crate::infra::repository::payment::PgPaymentUnitOfWork;
use crate::infra::repository::user::PgUserRepository;

/// One backend seen through the capability traits the workflows consume.
#[derive(Clone)]
pub struct Repositories {
    pub invoice_creator: Arc<dyn InvoiceCreator>,
    pub invoice_finder: Arc<dyn InvoiceFinder>,
    pub user_finder: Arc<dyn UserFinder>,
    pub user_lister: Arc<dyn UserLister>,
    pub payments: Arc<dyn PaymentUnitOfWork>,
}

impl Repositories {
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        let invoice_repo = Arc::new(PgInvoiceRepository::new(pool.clone()));
        let user_repo = Arc::new(PgUserRepository::new(pool.clone()));

        Repositories {
            invoice_creator: invoice_repo.clone(),
            invoice_finder: invoice_repo,
            user_finder: user_repo.clone(),
            user_lister: user_repo,
            payments: Arc::new(PgPaymentUnitOfWork::new(pool)),
        }
    }

    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);

        Repositories {
            invoice_creator: store.clone(),
            invoice_finder: store.clone(),
            user_finder: store.clone(),
            user_lister: store.clone(),
            payments: store,
        }
    }
}
