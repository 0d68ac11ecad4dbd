pub mod invoice;
pub mod payment;
pub mod user;


use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::domain::repository::RepoError;

/// Failures surfaced at the workflow boundary. Each variant maps to a
/// distinct outward response; none of them are retried here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("invoice not found")]
    InvoiceNotFound,
    #[error("invalid amount")]
    AmountMismatch,
    #[error("invoice already paid")]
    AlreadyPaid,
    #[error("deadline exceeded")]
    Timeout,
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    fn storage(err: RepoError, context: &'static str) -> Self {
        AppError::Internal(anyhow::Error::new(err).context(context))
    }
}

/// Runs `fut` under the request deadline. On expiry the future is dropped,
/// which aborts the outstanding store call and rolls back any open unit.
async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!(
                deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                "Workflow deadline exceeded"
            );
            Err(AppError::Timeout)
        }
    }
}
