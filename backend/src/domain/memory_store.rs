//! In-memory [`LedgerStore`] used by tests and by the server when no
//! database pool is configured.
//!
//! A single mutex serialises every operation, and multi-entity operations
//! mutate a staged copy of the state that is swapped in only on success, so
//! the store honours the same all-or-nothing contract as the SQL adapter.

use std::collections::HashMap;
use std::sync::Mutex;

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use super::investment::{Investment, ProjectFunding};
use super::ports::{LedgerStore, LedgerStoreError, PendingTransaction};
use super::principal::UserId;
use super::transaction::{
    Decision, PaymentMethod, Transaction, TransactionKind, TransactionStatus,
};
use super::wallet::Wallet;
use async_trait::async_trait;

#[derive(Debug, Default, Clone)]
struct LedgerState {
    wallets: Vec<Wallet>,
    transactions: Vec<Transaction>,
    investments: Vec<Investment>,
    projects: HashMap<Uuid, ProjectFunding>,
}

impl LedgerState {
    fn wallet_for_user(&self, user_id: UserId) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.user_id() == user_id)
    }

    fn owner_of_wallet(&self, wallet_id: Uuid) -> Option<UserId> {
        self.wallets
            .iter()
            .find(|w| w.id() == wallet_id)
            .map(Wallet::user_id)
    }

    fn replace_wallet(&mut self, wallet: Wallet) {
        if let Some(slot) = self.wallets.iter_mut().find(|w| w.id() == wallet.id()) {
            *slot = wallet;
        } else {
            self.wallets.push(wallet);
        }
    }

    fn get_or_create_wallet(&mut self, user_id: UserId) -> Wallet {
        if let Some(wallet) = self.wallet_for_user(user_id) {
            return wallet.clone();
        }
        let wallet = Wallet::empty(user_id, Utc::now());
        self.wallets.push(wallet.clone());
        wallet
    }
}

/// Mutex-guarded ledger state with transactional (stage-then-swap)
/// multi-entity operations.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<LedgerState>,
    #[cfg(test)]
    fail_next_investment: std::sync::atomic::AtomicBool,
}

impl InMemoryLedgerStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project's funding state, replacing any existing entry.
    pub fn seed_project(&self, funding: ProjectFunding) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.projects.insert(funding.project_id, funding);
    }

    /// Seed a wallet with an opening balance, returning the wallet.
    ///
    /// # Panics
    /// Panics when `balance` is negative; seeding is a test/bootstrap
    /// convenience and never runs on caller input.
    pub fn seed_wallet(&self, user_id: UserId, balance: BigDecimal) -> Wallet {
        let wallet = Wallet::new(Uuid::new_v4(), user_id, balance, Utc::now())
            .unwrap_or_else(|e| panic!("seed wallet: {e}"));
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.replace_wallet(wallet.clone());
        wallet
    }

    /// Make the next `record_investment` call fail after staging its writes,
    /// to exercise the all-or-nothing contract.
    #[cfg(test)]
    pub(crate) fn fail_next_investment(&self) {
        self.fail_next_investment
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        // A poisoned mutex only means another test panicked mid-operation;
        // the staged-swap discipline keeps the state itself consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn newest_first(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by_key(|t| std::cmp::Reverse(t.created_at));
    transactions
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, LedgerStoreError> {
        Ok(self.lock().get_or_create_wallet(user_id))
    }

    async fn transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, LedgerStoreError> {
        let state = self.lock();
        let Some(wallet) = state.wallet_for_user(user_id) else {
            return Ok(Vec::new());
        };
        let wallet_id = wallet.id();
        Ok(newest_first(
            state
                .transactions
                .iter()
                .filter(|t| t.wallet_id == wallet_id)
                .cloned()
                .collect(),
        ))
    }

    async fn create_deposit(
        &self,
        user_id: UserId,
        amount: BigDecimal,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut state = self.lock();
        let wallet = state.get_or_create_wallet(user_id);
        let transaction = Transaction {
            id: Uuid::new_v4(),
            wallet_id: wallet.id(),
            kind: TransactionKind::Deposit,
            status: TransactionStatus::Pending,
            amount,
            payment_method: method,
            proof_of_payment: None,
            notes,
            created_at: Utc::now(),
            processed_by: None,
            processed_at: None,
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn attach_proof(
        &self,
        user_id: UserId,
        transaction_id: Uuid,
        proof_reference: String,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut state = self.lock();
        let wallet_id = state
            .wallet_for_user(user_id)
            .map(Wallet::id)
            .ok_or(LedgerStoreError::NotFound {
                entity: "transaction",
            })?;
        let transaction = state
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id && t.wallet_id == wallet_id)
            .ok_or(LedgerStoreError::NotFound {
                entity: "transaction",
            })?;
        if !transaction.accepts_proof() {
            return Err(LedgerStoreError::InvalidTransition {
                id: transaction_id,
                status: transaction.status,
            });
        }
        transaction.proof_of_payment = Some(proof_reference);
        transaction.status = TransactionStatus::Verifying;
        Ok(transaction.clone())
    }

    async fn create_withdrawal(
        &self,
        user_id: UserId,
        amount: BigDecimal,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut state = self.lock();
        let mut staged = state.clone();
        let wallet = staged.get_or_create_wallet(user_id);
        let debited = wallet
            .debited(&amount)
            .ok_or(LedgerStoreError::InsufficientFunds)?;
        staged.replace_wallet(debited.clone());
        let transaction = Transaction {
            id: Uuid::new_v4(),
            wallet_id: debited.id(),
            kind: TransactionKind::Withdrawal,
            status: TransactionStatus::Pending,
            amount,
            payment_method: method,
            proof_of_payment: None,
            notes,
            created_at: Utc::now(),
            processed_by: None,
            processed_at: None,
        };
        staged.transactions.push(transaction.clone());
        *state = staged;
        Ok(transaction)
    }

    async fn pending_transactions(&self) -> Result<Vec<PendingTransaction>, LedgerStoreError> {
        let state = self.lock();
        let mut pending: Vec<PendingTransaction> = state
            .transactions
            .iter()
            .filter(|t| !t.status.is_terminal())
            .filter_map(|t| {
                state
                    .owner_of_wallet(t.wallet_id)
                    .map(|user_id| PendingTransaction {
                        user_id,
                        transaction: t.clone(),
                    })
            })
            .collect();
        pending.sort_by_key(|p| std::cmp::Reverse(p.transaction.created_at));
        Ok(pending)
    }

    async fn decide_transaction(
        &self,
        transaction_id: Uuid,
        decision: Decision,
        admin_id: UserId,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError> {
        let mut state = self.lock();
        let mut staged = state.clone();
        let transaction = staged
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or(LedgerStoreError::NotFound {
                entity: "transaction",
            })?;
        if !transaction.is_decidable() {
            return Err(LedgerStoreError::InvalidTransition {
                id: transaction_id,
                status: transaction.status,
            });
        }
        transaction.status = decision.resulting_status();
        transaction.processed_by = Some(admin_id);
        transaction.processed_at = Some(Utc::now());
        if let Some(notes) = notes {
            transaction.notes = Some(notes);
        }
        let decided = transaction.clone();
        if let Some(credit) = decided.credit_on(decision) {
            let wallet = staged
                .wallets
                .iter()
                .find(|w| w.id() == decided.wallet_id)
                .ok_or(LedgerStoreError::NotFound { entity: "wallet" })?
                .credited(credit);
            staged.replace_wallet(wallet);
        }
        *state = staged;
        Ok(decided)
    }

    async fn record_investment(
        &self,
        investor_id: UserId,
        project_id: Uuid,
        amount: BigDecimal,
    ) -> Result<(Investment, ProjectFunding), LedgerStoreError> {
        let mut state = self.lock();
        let mut staged = state.clone();
        let funding = staged
            .projects
            .get(&project_id)
            .ok_or(LedgerStoreError::NotFound { entity: "project" })?;
        if !funding.status.is_fundable() {
            return Err(LedgerStoreError::ProjectNotFundable);
        }
        let debited = staged
            .wallet_for_user(investor_id)
            .and_then(|w| w.debited(&amount))
            .ok_or(LedgerStoreError::InsufficientFunds)?;
        let updated_funding = funding.accepted(&amount);
        let investment = Investment {
            id: Uuid::new_v4(),
            investor_id,
            project_id,
            amount,
            invested_at: Utc::now(),
        };
        staged.replace_wallet(debited);
        staged.projects.insert(project_id, updated_funding.clone());
        staged.investments.push(investment.clone());
        #[cfg(test)]
        if self
            .fail_next_investment
            .swap(false, std::sync::atomic::Ordering::SeqCst)
        {
            return Err(LedgerStoreError::query("injected failure"));
        }
        *state = staged;
        Ok((investment, updated_funding))
    }

    async fn investments_for_user(
        &self,
        investor_id: UserId,
    ) -> Result<Vec<Investment>, LedgerStoreError> {
        let state = self.lock();
        let mut investments: Vec<Investment> = state
            .investments
            .iter()
            .filter(|i| i.investor_id == investor_id)
            .cloned()
            .collect();
        investments.sort_by_key(|i| std::cmp::Reverse(i.invested_at));
        Ok(investments)
    }
}
