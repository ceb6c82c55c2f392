//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::investment::{Investment, ProjectFunding};
use crate::domain::ports::LedgerStoreError;
use crate::domain::principal::UserId;
use crate::domain::transaction::Transaction;
use crate::domain::wallet::Wallet;

use super::schema::{investments, projects, transactions, wallets};

fn parse_column<T>(value: &str, column: &str) -> Result<T, LedgerStoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|err| LedgerStoreError::query(format!("invalid {column} column: {err}")))
}

/// Row struct for reading from the wallets table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = wallets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WalletRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<WalletRow> for Wallet {
    type Error = LedgerStoreError;

    fn try_from(row: WalletRow) -> Result<Self, Self::Error> {
        Wallet::new(
            row.id,
            UserId::from_uuid(row.user_id),
            row.balance,
            row.created_at,
        )
        .map_err(|err| LedgerStoreError::query(format!("invalid wallet row: {err}")))
    }
}

/// Insertable struct for creating wallet records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallets)]
pub(crate) struct NewWalletRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: BigDecimal,
}

/// Row struct for reading from the transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: String,
    pub status: String,
    pub amount: BigDecimal,
    pub payment_method: String,
    pub proof_of_payment: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = LedgerStoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            wallet_id: row.wallet_id,
            kind: parse_column(&row.kind, "kind")?,
            status: parse_column(&row.status, "status")?,
            amount: row.amount,
            payment_method: parse_column(&row.payment_method, "payment_method")?,
            proof_of_payment: row.proof_of_payment,
            notes: row.notes,
            created_at: row.created_at,
            processed_by: row.processed_by.map(UserId::from_uuid),
            processed_at: row.processed_at,
        })
    }
}

/// Insertable struct for creating transaction records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub(crate) struct NewTransactionRow<'a> {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: &'a str,
    pub status: &'a str,
    pub amount: &'a BigDecimal,
    pub payment_method: &'a str,
    pub notes: Option<&'a str>,
}

/// Changeset applied when an escrow decision settles a transaction.
///
/// `notes` is only written when the deciding admin supplies replacement text;
/// `AsChangeset` skips `None` fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = transactions)]
pub(crate) struct DecisionUpdate<'a> {
    pub status: &'a str,
    pub processed_by: Uuid,
    pub processed_at: DateTime<Utc>,
    pub notes: Option<&'a str>,
}

/// Row struct for reading from the investments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = investments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvestmentRow {
    pub id: Uuid,
    pub investor_id: Uuid,
    pub project_id: Uuid,
    pub amount: BigDecimal,
    pub invested_at: DateTime<Utc>,
}

impl From<InvestmentRow> for Investment {
    fn from(row: InvestmentRow) -> Self {
        Self {
            id: row.id,
            investor_id: UserId::from_uuid(row.investor_id),
            project_id: row.project_id,
            amount: row.amount,
            invested_at: row.invested_at,
        }
    }
}

/// Insertable struct for creating investment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = investments)]
pub(crate) struct NewInvestmentRow<'a> {
    pub id: Uuid,
    pub investor_id: Uuid,
    pub project_id: Uuid,
    pub amount: &'a BigDecimal,
}

/// Row struct for reading from the projects table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub funding_goal: BigDecimal,
    pub current_funding: BigDecimal,
    pub status: String,
}

impl TryFrom<ProjectRow> for ProjectFunding {
    type Error = LedgerStoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: row.id,
            funding_goal: row.funding_goal,
            current_funding: row.current_funding,
            status: parse_column(&row.status, "status")?,
        })
    }
}
