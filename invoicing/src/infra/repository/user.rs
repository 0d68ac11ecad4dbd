use async_trait::async_trait;
use sqlx::{PgExecutor, Pool, Postgres};

use crate::domain::model::{User, UserId};
use crate::domain::money::Money;
use crate::domain::repository::{self, RepoError, RepoResult};

#[derive(Clone)]
pub struct PgUserRepository {
    pub pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        PgUserRepository { pool }
    }

    /// `balance = balance + delta` in one statement; the row lock it takes
    /// serializes concurrent credits to the same user.
    pub async fn modify_balance<'e, E>(executor: E, user_id: UserId, delta: Money) -> RepoResult<()>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE users SET balance = balance + $1 WHERE id = $2")
            .bind(delta.minor_units())
            .bind(user_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl repository::UserFinder for PgUserRepository {
    async fn get_by_id(&self, id: UserId) -> RepoResult<User> {
        let row = sqlx::query("SELECT id, first_name, last_name, balance FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(User::try_from(row)?)
    }
}

#[async_trait]
impl repository::UserLister for PgUserRepository {
    async fn get_all(&self) -> RepoResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, first_name, last_name, balance FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(User::try_from(row)?);
        }
        Ok(users)
    }
}
