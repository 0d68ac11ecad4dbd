//! Runs against the database in `DATABASE_URL`; the tables are truncated.
//! `cargo test -- --ignored` to include it.

#[cfg(test)]
mod tests {
    use invoicing::domain::model::{InvoiceStatus, User};
    use invoicing::domain::money::Money;
    use invoicing::domain::repository::{InvoiceFinder, UserFinder, UserLister};
    use invoicing::infra::db;
    use invoicing::infra::repository::Repositories;
    use invoicing::service::invoice::InvoiceService;
    use invoicing::service::payment::PaymentService;
    use invoicing::service::AppError;
    use sqlx::{Executor, Pool, Postgres, Row};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinSet;

    const DEADLINE: Duration = Duration::from_secs(10);

    async fn pool() -> Pool<Postgres> {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::connect(&database_url, 12).await.unwrap();
        db::migrate(&pool).await.unwrap();
        pool.execute("TRUNCATE invoices, users RESTART IDENTITY CASCADE")
            .await
            .unwrap();
        pool
    }

    async fn insert_user(pool: &Pool<Postgres>, first_name: &str, last_name: &str, balance: i64) -> i64 {
        sqlx::query("INSERT INTO users(first_name, last_name, balance) VALUES ($1, $2, $3) RETURNING id")
            .bind(first_name)
            .bind(last_name)
            .bind(balance)
            .fetch_one(pool)
            .await
            .unwrap()
            .get("id")
    }

    // Both cases share the tables, so they run in one test.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[ignore = "needs a Postgres database in DATABASE_URL"]
    async fn test_postgres_payment_workflow() {
        let pool = pool().await;
        let john = insert_user(&pool, "John", "Doe", 1000).await;
        let jane = insert_user(&pool, "Jane", "Smith", 2000).await;

        let repos = Repositories::postgres(pool.clone());
        let invoices = InvoiceService::new(repos.user_finder.clone(), repos.invoice_creator.clone(), DEADLINE);
        let payments = Arc::new(PaymentService::new(
            repos.invoice_finder.clone(),
            repos.payments.clone(),
            DEADLINE,
        ));

        let users = repos.user_lister.get_all().await.unwrap();
        assert_eq!(
            users,
            vec![
                User {
                    id: john,
                    first_name: "John".to_string(),
                    last_name: "Doe".to_string(),
                    balance: Money::from_minor(1000),
                },
                User {
                    id: jane,
                    first_name: "Jane".to_string(),
                    last_name: "Smith".to_string(),
                    balance: Money::from_minor(2000),
                },
            ]
        );

        let err = invoices.create_invoice(9999, 10.0, "rent").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let rent = invoices.create_invoice(john, 100.00, "rent").await.unwrap();
        let invoice = repos.invoice_finder.get_by_id(rent).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.amount, Money::from_minor(10000));

        let err = payments.process_transaction(rent, 99.99, "wire-1").await.unwrap_err();
        assert!(matches!(err, AppError::AmountMismatch));
        payments.process_transaction(rent, 100.00, "wire-1").await.unwrap();
        let err = payments.process_transaction(rent, 100.00, "wire-1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyPaid));

        let john_user = repos.user_finder.get_by_id(john).await.unwrap();
        assert_eq!(john_user.balance, Money::from_minor(11000));
        let invoice = repos.invoice_finder.get_by_id(rent).await.unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);

        let err = payments.process_transaction(rent + 100, 1.0, "wire-2").await.unwrap_err();
        assert!(matches!(err, AppError::InvoiceNotFound));

        let subscription = invoices.create_invoice(jane, 42.50, "subscription").await.unwrap();
        let mut set = JoinSet::new();
        for attempt in 0..10 {
            let payments = Arc::clone(&payments);
            set.spawn(async move {
                payments
                    .process_transaction(subscription, 42.50, &format!("attempt-{attempt}"))
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

        let jane_user = repos.user_finder.get_by_id(jane).await.unwrap();
        assert_eq!(jane_user.balance, Money::from_minor(2000 + 4250));
    }
}
