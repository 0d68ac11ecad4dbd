use std::fmt;
use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::Row;
use thiserror::Error;

use crate::domain::money::Money;

pub type UserId = i64;
pub type InvoiceId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub balance: Money,
}

impl TryFrom<PgRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            balance: Money::from_minor(row.try_get("balance")?),
        })
    }
}

/// Invoice lifecycle. `Pending -> Paid` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

#[derive(Debug, Error)]
#[error("unknown invoice status {0:?}")]
pub struct UnknownStatus(String);

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    pub status: InvoiceStatus,
    pub label: String,
    /// Fixed at creation.
    pub amount: Money,
}

impl TryFrom<PgRow> for Invoice {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        let status: String = row.try_get("status")?;
        Ok(Invoice {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            status: status
                .parse::<InvoiceStatus>()
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            label: row.try_get("label")?,
            amount: Money::from_minor(row.try_get("amount")?),
        })
    }
}

/// An invoice that has not been stored yet; the store assigns the id and
/// starts it as pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub user_id: UserId,
    pub label: String,
    pub amount: Money,
}
