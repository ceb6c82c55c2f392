//! PostgreSQL-backed [`LedgerStore`] implementation using Diesel.
//!
//! Every multi-entity operation runs inside a database transaction, and every
//! balance or status guard executes as a conditional `UPDATE` (or behind a
//! `FOR UPDATE` row lock) so concurrent requests cannot overspend a wallet,
//! settle a transaction twice, or overfill a project unnoticed.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::investment::{Investment, ProjectFunding};
use crate::domain::ports::{LedgerStore, LedgerStoreError, PendingTransaction};
use crate::domain::principal::UserId;
use crate::domain::transaction::{Decision, PaymentMethod, Transaction, TransactionKind};
use crate::domain::wallet::Wallet;

use super::error_mapping::map_pool_error;
use super::models::{
    DecisionUpdate, InvestmentRow, NewInvestmentRow, NewTransactionRow, NewWalletRow, ProjectRow,
    TransactionRow, WalletRow,
};
use super::pool::DbPool;
use super::schema::{investments, projects, transactions, wallets};

/// Diesel-backed implementation of the [`LedgerStore`] port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Fetch the user's wallet row, inserting an empty one if absent.
///
/// The `ON CONFLICT DO NOTHING` insert makes first-use creation race-safe:
/// two concurrent callers both end up reading the single surviving row.
async fn ensure_wallet<C>(conn: &mut C, user_id: Uuid) -> Result<WalletRow, LedgerStoreError>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    diesel::insert_into(wallets::table)
        .values(&NewWalletRow {
            id: Uuid::new_v4(),
            user_id,
            balance: BigDecimal::from(0),
        })
        .on_conflict(wallets::user_id)
        .do_nothing()
        .execute(conn)
        .await?;

    wallets::table
        .filter(wallets::user_id.eq(user_id))
        .select(WalletRow::as_select())
        .first(conn)
        .await
        .map_err(Into::into)
}

/// Debit `amount` from the wallet iff the balance covers it.
///
/// `InsufficientFunds` when the guard matched no row.
async fn debit_wallet<C>(
    conn: &mut C,
    wallet_id: Uuid,
    amount: &BigDecimal,
) -> Result<(), LedgerStoreError>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let debited = diesel::update(
        wallets::table.filter(
            wallets::id
                .eq(wallet_id)
                .and(wallets::balance.ge(amount.clone())),
        ),
    )
    .set(wallets::balance.eq(wallets::balance - amount.clone()))
    .execute(conn)
    .await?;

    if debited == 0 {
        return Err(LedgerStoreError::InsufficientFunds);
    }
    Ok(())
}

fn rows_to_transactions(rows: Vec<TransactionRow>) -> Result<Vec<Transaction>, LedgerStoreError> {
    rows.into_iter().map(Transaction::try_from).collect()
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ensure_wallet(&mut conn, *user_id.as_uuid()).await?;
        Wallet::try_from(row)
    }

    async fn transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let wallet_id: Option<Uuid> = wallets::table
            .filter(wallets::user_id.eq(user_id.as_uuid()))
            .select(wallets::id)
            .first(&mut conn)
            .await
            .optional()?;
        let Some(wallet_id) = wallet_id else {
            return Ok(Vec::new());
        };

        let rows = transactions::table
            .filter(transactions::wallet_id.eq(wallet_id))
            .order(transactions::created_at.desc())
            .select(TransactionRow::as_select())
            .load(&mut conn)
            .await?;
        rows_to_transactions(rows)
    }

    async fn create_deposit(
        &self,
        user_id: UserId,
        amount: BigDecimal,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user_id.as_uuid();

        let row = conn
            .transaction::<TransactionRow, LedgerStoreError, _>(|conn| {
                async move {
                    let wallet = ensure_wallet(conn, user_id).await?;
                    let row = diesel::insert_into(transactions::table)
                        .values(&NewTransactionRow {
                            id: Uuid::new_v4(),
                            wallet_id: wallet.id,
                            kind: TransactionKind::Deposit.as_str(),
                            status: "pending",
                            amount: &amount,
                            payment_method: method.as_str(),
                            notes: notes.as_deref(),
                        })
                        .returning(TransactionRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;
        Transaction::try_from(row)
    }

    async fn attach_proof(
        &self,
        user_id: UserId,
        transaction_id: Uuid,
        proof_reference: String,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user_id.as_uuid();

        let row = conn
            .transaction::<TransactionRow, LedgerStoreError, _>(|conn| {
                async move {
                    let wallet_id: Option<Uuid> = wallets::table
                        .filter(wallets::user_id.eq(user_id))
                        .select(wallets::id)
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(wallet_id) = wallet_id else {
                        return Err(LedgerStoreError::NotFound {
                            entity: "transaction",
                        });
                    };

                    // Guarded update: only the owner's pending deposit moves.
                    let updated: Option<TransactionRow> = diesel::update(
                        transactions::table.filter(
                            transactions::id
                                .eq(transaction_id)
                                .and(transactions::wallet_id.eq(wallet_id))
                                .and(transactions::kind.eq("deposit"))
                                .and(transactions::status.eq("pending")),
                        ),
                    )
                    .set((
                        transactions::proof_of_payment.eq(proof_reference),
                        transactions::status.eq("verifying"),
                    ))
                    .returning(TransactionRow::as_returning())
                    .get_result(conn)
                    .await
                    .optional()?;
                    if let Some(row) = updated {
                        return Ok(row);
                    }

                    // The guard failed: report why.
                    let current: Option<TransactionRow> = transactions::table
                        .filter(
                            transactions::id
                                .eq(transaction_id)
                                .and(transactions::wallet_id.eq(wallet_id)),
                        )
                        .select(TransactionRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    match current {
                        Some(row) => {
                            let txn = Transaction::try_from(row)?;
                            Err(LedgerStoreError::InvalidTransition {
                                id: transaction_id,
                                status: txn.status,
                            })
                        }
                        None => Err(LedgerStoreError::NotFound {
                            entity: "transaction",
                        }),
                    }
                }
                .scope_boxed()
            })
            .await?;
        Transaction::try_from(row)
    }

    async fn create_withdrawal(
        &self,
        user_id: UserId,
        amount: BigDecimal,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *user_id.as_uuid();

        let row = conn
            .transaction::<TransactionRow, LedgerStoreError, _>(|conn| {
                async move {
                    let wallet = ensure_wallet(conn, user_id).await?;
                    debit_wallet(conn, wallet.id, &amount).await?;
                    let row = diesel::insert_into(transactions::table)
                        .values(&NewTransactionRow {
                            id: Uuid::new_v4(),
                            wallet_id: wallet.id,
                            kind: TransactionKind::Withdrawal.as_str(),
                            status: "pending",
                            amount: &amount,
                            payment_method: method.as_str(),
                            notes: notes.as_deref(),
                        })
                        .returning(TransactionRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await?;
        Transaction::try_from(row)
    }

    async fn pending_transactions(&self) -> Result<Vec<PendingTransaction>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(TransactionRow, Uuid)> = transactions::table
            .inner_join(wallets::table)
            .filter(transactions::status.eq_any(["pending", "verifying"]))
            .order(transactions::created_at.desc())
            .select((TransactionRow::as_select(), wallets::user_id))
            .load(&mut conn)
            .await?;

        rows.into_iter()
            .map(|(row, owner)| {
                Ok(PendingTransaction {
                    user_id: UserId::from_uuid(owner),
                    transaction: Transaction::try_from(row)?,
                })
            })
            .collect()
    }

    async fn decide_transaction(
        &self,
        transaction_id: Uuid,
        decision: Decision,
        admin_id: UserId,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let admin_id = *admin_id.as_uuid();

        conn.transaction::<Transaction, LedgerStoreError, _>(|conn| {
            async move {
                // Lock the row so concurrent decisions serialise.
                let current: Option<TransactionRow> = transactions::table
                    .find(transaction_id)
                    .for_update()
                    .select(TransactionRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let Some(current) = current else {
                    return Err(LedgerStoreError::NotFound {
                        entity: "transaction",
                    });
                };
                let txn = Transaction::try_from(current)?;
                if !txn.is_decidable() {
                    return Err(LedgerStoreError::InvalidTransition {
                        id: transaction_id,
                        status: txn.status,
                    });
                }

                let update = DecisionUpdate {
                    status: decision.resulting_status().as_str(),
                    processed_by: admin_id,
                    processed_at: Utc::now(),
                    notes: notes.as_deref(),
                };
                let settled: TransactionRow =
                    diesel::update(transactions::table.find(transaction_id))
                        .set(&update)
                        .returning(TransactionRow::as_returning())
                        .get_result(conn)
                        .await?;
                let settled = Transaction::try_from(settled)?;

                if let Some(credit) = settled.credit_on(decision) {
                    diesel::update(wallets::table.find(settled.wallet_id))
                        .set(wallets::balance.eq(wallets::balance + credit.clone()))
                        .execute(conn)
                        .await?;
                }
                Ok(settled)
            }
            .scope_boxed()
        })
        .await
    }

    async fn record_investment(
        &self,
        investor_id: UserId,
        project_id: Uuid,
        amount: BigDecimal,
    ) -> Result<(Investment, ProjectFunding), LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let investor_id = *investor_id.as_uuid();

        conn.transaction::<(Investment, ProjectFunding), LedgerStoreError, _>(|conn| {
            async move {
                // Lock the project row so funding increments serialise.
                let project: Option<ProjectRow> = projects::table
                    .find(project_id)
                    .for_update()
                    .select(ProjectRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let Some(project) = project else {
                    return Err(LedgerStoreError::NotFound { entity: "project" });
                };
                let funding = ProjectFunding::try_from(project)?;
                if !funding.status.is_fundable() {
                    return Err(LedgerStoreError::ProjectNotFundable);
                }

                // A missing wallet fails the same guard as a low balance.
                let debited = diesel::update(
                    wallets::table.filter(
                        wallets::user_id
                            .eq(investor_id)
                            .and(wallets::balance.ge(amount.clone())),
                    ),
                )
                .set(wallets::balance.eq(wallets::balance - amount.clone()))
                .execute(conn)
                .await?;
                if debited == 0 {
                    return Err(LedgerStoreError::InsufficientFunds);
                }

                let updated = funding.accepted(&amount);
                diesel::update(projects::table.find(project_id))
                    .set((
                        projects::current_funding.eq(updated.current_funding.clone()),
                        projects::status.eq(updated.status.as_str()),
                    ))
                    .execute(conn)
                    .await?;

                let row: InvestmentRow = diesel::insert_into(investments::table)
                    .values(&NewInvestmentRow {
                        id: Uuid::new_v4(),
                        investor_id,
                        project_id,
                        amount: &amount,
                    })
                    .returning(InvestmentRow::as_returning())
                    .get_result(conn)
                    .await?;

                Ok((Investment::from(row), updated))
            }
            .scope_boxed()
        })
        .await
    }

    async fn investments_for_user(
        &self,
        investor_id: UserId,
    ) -> Result<Vec<Investment>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<InvestmentRow> = investments::table
            .filter(investments::investor_id.eq(investor_id.as_uuid()))
            .order(investments::invested_at.desc())
            .select(InvestmentRow::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows.into_iter().map(Investment::from).collect())
    }
}
