//! Ledger domain services.
//!
//! One service implements all four driving ports over a [`LedgerStore`].
//! Input validation (positive amounts, role checks, non-empty proof
//! references) lives here; balance and state-machine guards live inside the
//! store so they execute within the atomic unit they protect.

use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tracing::info;

use super::investment::Investment;
use super::ports::{
    DecisionRequest, DepositRequest, EscrowWorkflow, InvestRequest, InvestmentLedger,
    InvestmentReceipt, LedgerStore, LedgerStoreError, PendingTransaction, ProofRequest,
    TransactionCommand, WalletQuery, WithdrawalRequest,
};
use super::principal::{Principal, UserId};
use super::transaction::Transaction;
use super::wallet::Wallet;
use super::Error;

fn map_store_error(error: LedgerStoreError) -> Error {
    match error {
        LedgerStoreError::InsufficientFunds => {
            Error::insufficient_funds("wallet balance is insufficient")
        }
        LedgerStoreError::InvalidTransition { id, status } => {
            Error::invalid_state(format!("transaction {id} is already {status}"))
        }
        LedgerStoreError::ProjectNotFundable => {
            Error::project_not_fundable("project is not accepting investments")
        }
        LedgerStoreError::NotFound { entity } => Error::not_found(format!("{entity} not found")),
        LedgerStoreError::Connection { message } => {
            Error::service_unavailable(format!("ledger store unavailable: {message}"))
        }
        LedgerStoreError::Query { message } => {
            Error::internal(format!("ledger store error: {message}"))
        }
    }
}

fn require_positive(amount: &BigDecimal) -> Result<(), Error> {
    if *amount <= BigDecimal::from(0) {
        return Err(Error::invalid_amount("amount must be greater than zero"));
    }
    Ok(())
}

fn require_escrow_role(principal: Principal) -> Result<(), Error> {
    if !principal.role.can_decide_transactions() {
        return Err(Error::forbidden(
            "escrow decisions require the Admin or EscrowManager role",
        ));
    }
    Ok(())
}

/// Service implementing the wallet, transaction, escrow, and investment
/// driving ports.
#[derive(Clone)]
pub struct LedgerService<S> {
    store: Arc<S>,
}

impl<S> LedgerService<S> {
    /// Create a new service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> WalletQuery for LedgerService<S>
where
    S: LedgerStore,
{
    async fn balance(&self, user_id: UserId) -> Result<Wallet, Error> {
        self.store
            .get_or_create_wallet(user_id)
            .await
            .map_err(map_store_error)
    }

    async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Error> {
        self.store
            .transactions_for_user(user_id)
            .await
            .map_err(map_store_error)
    }
}

#[async_trait]
impl<S> TransactionCommand for LedgerService<S>
where
    S: LedgerStore,
{
    async fn create_deposit(&self, request: DepositRequest) -> Result<Transaction, Error> {
        require_positive(&request.amount)?;
        let notes = format!("Deposit request via {}", request.method);
        let transaction = self
            .store
            .create_deposit(request.user_id, request.amount, request.method, Some(notes))
            .await
            .map_err(map_store_error)?;
        info!(
            transaction_id = %transaction.id,
            user_id = %request.user_id,
            "deposit created"
        );
        Ok(transaction)
    }

    async fn attach_proof(&self, request: ProofRequest) -> Result<Transaction, Error> {
        if request.proof_reference.trim().is_empty() {
            return Err(Error::invalid_request(
                "proof reference must not be empty",
            ));
        }
        let transaction = self
            .store
            .attach_proof(
                request.user_id,
                request.transaction_id,
                request.proof_reference,
            )
            .await
            .map_err(map_store_error)?;
        info!(transaction_id = %transaction.id, "proof of payment attached");
        Ok(transaction)
    }

    async fn create_withdrawal(&self, request: WithdrawalRequest) -> Result<Transaction, Error> {
        require_positive(&request.amount)?;
        if request.account_details.trim().is_empty() {
            return Err(Error::invalid_request(
                "account details must not be empty",
            ));
        }
        let notes = format!(
            "Withdrawal request via {}: {}",
            request.method, request.account_details
        );
        let transaction = self
            .store
            .create_withdrawal(request.user_id, request.amount, request.method, Some(notes))
            .await
            .map_err(map_store_error)?;
        info!(
            transaction_id = %transaction.id,
            user_id = %request.user_id,
            "withdrawal created and funds reserved"
        );
        Ok(transaction)
    }
}

#[async_trait]
impl<S> EscrowWorkflow for LedgerService<S>
where
    S: LedgerStore,
{
    async fn pending_transactions(
        &self,
        principal: Principal,
    ) -> Result<Vec<PendingTransaction>, Error> {
        require_escrow_role(principal)?;
        self.store
            .pending_transactions()
            .await
            .map_err(map_store_error)
    }

    async fn decide(
        &self,
        principal: Principal,
        request: DecisionRequest,
    ) -> Result<Transaction, Error> {
        require_escrow_role(principal)?;
        let transaction = self
            .store
            .decide_transaction(
                request.transaction_id,
                request.decision,
                principal.id,
                request.notes,
            )
            .await
            .map_err(map_store_error)?;
        info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            processed_by = %principal.id,
            "escrow decision applied"
        );
        Ok(transaction)
    }
}

#[async_trait]
impl<S> InvestmentLedger for LedgerService<S>
where
    S: LedgerStore,
{
    async fn invest(&self, request: InvestRequest) -> Result<InvestmentReceipt, Error> {
        require_positive(&request.amount)?;
        let (investment, funding) = self
            .store
            .record_investment(request.investor_id, request.project_id, request.amount)
            .await
            .map_err(map_store_error)?;
        info!(
            investment_id = %investment.id,
            project_id = %funding.project_id,
            project_status = %funding.status,
            "investment recorded"
        );
        Ok(InvestmentReceipt {
            investment,
            funding,
        })
    }

    async fn investments(&self, investor_id: UserId) -> Result<Vec<Investment>, Error> {
        self.store
            .investments_for_user(investor_id)
            .await
            .map_err(map_store_error)
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
