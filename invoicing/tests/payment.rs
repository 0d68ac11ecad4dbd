mod common;

#[cfg(test)]
mod tests {
    use crate::common::seeded_store;
    use invoicing::domain::model::InvoiceStatus;
    use invoicing::domain::money::Money;
    use invoicing::domain::repository::{InvoiceFinder, UserFinder};
    use invoicing::infra::repository::memory::MemoryStore;
    use invoicing::infra::repository::Repositories;
    use invoicing::service::invoice::InvoiceService;
    use invoicing::service::payment::PaymentService;
    use invoicing::service::AppError;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinSet;

    const DEADLINE: Duration = Duration::from_secs(5);

    fn services(store: &MemoryStore) -> (InvoiceService, PaymentService) {
        let repos = Repositories::memory(store.clone());
        (
            InvoiceService::new(repos.user_finder, repos.invoice_creator, DEADLINE),
            PaymentService::new(repos.invoice_finder, repos.payments, DEADLINE),
        )
    }

    async fn balance(store: &MemoryStore, user_id: i64) -> Money {
        UserFinder::get_by_id(store, user_id).await.unwrap().balance
    }

    async fn status(store: &MemoryStore, invoice_id: i64) -> InvoiceStatus {
        InvoiceFinder::get_by_id(store, invoice_id).await.unwrap().status
    }

    #[tokio::test]
    async fn test_rent_scenario() {
        let store = seeded_store().await;
        let (invoices, payments) = services(&store);

        let rent = invoices.create_invoice(1, 100.00, "rent").await.unwrap();
        let invoice = InvoiceFinder::get_by_id(&store, rent).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.amount, Money::from_minor(10000));

        payments.process_transaction(rent, 100.00, "wire-1").await.unwrap();
        assert_eq!(balance(&store, 1).await, Money::from_minor(11000));
        assert_eq!(status(&store, rent).await, InvoiceStatus::Paid);

        let err = payments.process_transaction(rent, 100.00, "wire-1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyPaid));
        assert_eq!(balance(&store, 1).await, Money::from_minor(11000));

        let other = invoices.create_invoice(1, 100.00, "deposit").await.unwrap();
        let err = payments.process_transaction(other, 99.99, "wire-2").await.unwrap_err();
        assert!(matches!(err, AppError::AmountMismatch));
        assert_eq!(balance(&store, 1).await, Money::from_minor(11000));
        assert_eq!(status(&store, other).await, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_invoice_changes_nothing() {
        let store = seeded_store().await;
        let (_, payments) = services(&store);

        let err = payments.process_transaction(77, 10.00, "wire-3").await.unwrap_err();

        assert!(matches!(err, AppError::InvoiceNotFound));
        assert_eq!(balance(&store, 1).await, Money::from_minor(1000));
        assert_eq!(balance(&store, 2).await, Money::from_minor(2000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_payments_credit_once() {
        let store = seeded_store().await;
        let (invoices, payments) = services(&store);
        let invoice_id = invoices.create_invoice(2, 42.50, "subscription").await.unwrap();

        let payments = Arc::new(payments);
        let mut set = JoinSet::new();
        for attempt in 0..10 {
            let payments = Arc::clone(&payments);
            set.spawn(async move {
                payments
                    .process_transaction(invoice_id, 42.50, &format!("attempt-{attempt}"))
                    .await
            });
        }

        let (mut succeeded, mut already_paid) = (0, 0);
        while let Some(result) = set.join_next().await {
            match result.unwrap() {
                Ok(()) => succeeded += 1,
                Err(AppError::AlreadyPaid) => already_paid += 1,
                Err(err) => panic!("unexpected error: {err:?}"),
            }
        }

        assert_eq!((succeeded, already_paid), (1, 9));
        assert_eq!(balance(&store, 2).await, Money::from_minor(2000 + 4250));
        assert_eq!(status(&store, invoice_id).await, InvoiceStatus::Paid);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_invoices_of_one_user_all_land() {
        let store = seeded_store().await;
        let (invoices, payments) = services(&store);

        let mut ids = Vec::new();
        for n in 0..10 {
            ids.push(invoices.create_invoice(1, 1.25, &format!("fee {n}")).await.unwrap());
        }

        let payments = Arc::new(payments);
        let mut set = JoinSet::new();
        for id in ids {
            let payments = Arc::clone(&payments);
            set.spawn(async move { payments.process_transaction(id, 1.25, "batch").await });
        }
        while let Some(result) = set.join_next().await {
            result.unwrap().unwrap();
        }

        assert_eq!(balance(&store, 1).await, Money::from_minor(1000 + 10 * 125));
    }
}
