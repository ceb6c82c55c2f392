//! Domain ports defining the edges of the hexagon.
//!
//! Driving ports are the use-case traits the HTTP adapter calls into; the
//! driven [`LedgerStore`] port is what persistence adapters implement. Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use super::investment::{Investment, ProjectFunding};
use super::principal::{Principal, UserId};
use super::transaction::{Decision, PaymentMethod, Transaction, TransactionStatus};
use super::wallet::Wallet;
use super::Error;

/// Deposit creation request.
#[derive(Debug, Clone)]
pub struct DepositRequest {
    /// Depositing user.
    pub user_id: UserId,
    /// Requested amount; validated positive by the service.
    pub amount: BigDecimal,
    /// Payment rail used for the transfer.
    pub method: PaymentMethod,
}

/// Proof-of-payment attachment request.
#[derive(Debug, Clone)]
pub struct ProofRequest {
    /// Caller; must own the transaction.
    pub user_id: UserId,
    /// Target deposit transaction.
    pub transaction_id: Uuid,
    /// Opaque reference returned by the blob store.
    pub proof_reference: String,
}

/// Withdrawal creation request.
#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    /// Withdrawing user.
    pub user_id: UserId,
    /// Requested amount; validated positive by the service.
    pub amount: BigDecimal,
    /// Payout rail.
    pub method: PaymentMethod,
    /// Free-text payout destination (bank account, mobile number).
    pub account_details: String,
}

/// Escrow decision request.
#[derive(Debug, Clone)]
pub struct DecisionRequest {
    /// Transaction being decided.
    pub transaction_id: Uuid,
    /// Approve or reject.
    pub decision: Decision,
    /// Replacement notes recorded on the transaction, when supplied.
    pub notes: Option<String>,
}

/// Investment request.
#[derive(Debug, Clone)]
pub struct InvestRequest {
    /// Investing user.
    pub investor_id: UserId,
    /// Target project.
    pub project_id: Uuid,
    /// Requested amount; validated positive by the service.
    pub amount: BigDecimal,
}

/// Outcome of a successful investment: the immutable record plus the
/// project funding state it produced.
#[derive(Debug, Clone)]
pub struct InvestmentReceipt {
    /// The recorded investment.
    pub investment: Investment,
    /// Funding state after the increment.
    pub funding: ProjectFunding,
}

/// A pending or verifying transaction with its wallet owner, as listed for
/// escrow officers.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    /// Owner of the wallet behind the transaction.
    pub user_id: UserId,
    /// The transaction awaiting a decision.
    pub transaction: Transaction,
}

/// Read-side port for wallet state.
#[async_trait]
pub trait WalletQuery: Send + Sync {
    /// Return the caller's wallet, creating an empty one on first use.
    async fn balance(&self, user_id: UserId) -> Result<Wallet, Error>;

    /// List the caller's transactions, newest first.
    async fn transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Error>;
}

/// Command port for deposits and withdrawals.
#[async_trait]
pub trait TransactionCommand: Send + Sync {
    /// Create a pending deposit. The wallet is not credited until an escrow
    /// officer approves the transaction.
    async fn create_deposit(&self, request: DepositRequest) -> Result<Transaction, Error>;

    /// Attach proof of payment to a pending deposit, moving it to
    /// `verifying`.
    async fn attach_proof(&self, request: ProofRequest) -> Result<Transaction, Error>;

    /// Create a pending withdrawal, debiting the wallet immediately so the
    /// reserved funds cannot be spent twice.
    async fn create_withdrawal(&self, request: WithdrawalRequest) -> Result<Transaction, Error>;
}

/// Admin-facing escrow verification workflow.
#[async_trait]
pub trait EscrowWorkflow: Send + Sync {
    /// List transactions awaiting a decision. Requires an escrow role.
    async fn pending_transactions(
        &self,
        principal: Principal,
    ) -> Result<Vec<PendingTransaction>, Error>;

    /// Approve or reject a transaction, reconciling the wallet accordingly.
    /// Requires an escrow role.
    async fn decide(
        &self,
        principal: Principal,
        request: DecisionRequest,
    ) -> Result<Transaction, Error>;
}

/// Command and read port for the investment ledger.
#[async_trait]
pub trait InvestmentLedger: Send + Sync {
    /// Atomically record an investment: insert the record, bump the project
    /// funding, recompute its status, and debit the investor wallet.
    async fn invest(&self, request: InvestRequest) -> Result<InvestmentReceipt, Error>;

    /// List the caller's investments, newest first.
    async fn investments(&self, investor_id: UserId) -> Result<Vec<Investment>, Error>;
}

/// Failures surfaced by [`LedgerStore`] adapters.
///
/// The domain-rule variants (`InsufficientFunds`, `InvalidTransition`,
/// `ProjectNotFundable`) originate inside the store because the checks must
/// run within the same atomic unit as the writes they guard.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerStoreError {
    /// Balance guard failed during a debit.
    #[error("wallet balance does not cover the requested amount")]
    InsufficientFunds,
    /// Status guard failed during a state transition.
    #[error("transaction {id} is {status}; the requested transition is not allowed")]
    InvalidTransition {
        /// Transaction whose guard failed.
        id: Uuid,
        /// Status observed under lock.
        status: TransactionStatus,
    },
    /// Project status guard failed during an investment.
    #[error("project is not accepting investments")]
    ProjectNotFundable,
    /// The referenced entity does not exist (or is not visible to the
    /// caller, for ownership-scoped lookups).
    #[error("{entity} not found")]
    NotFound {
        /// Entity kind for the caller-facing message.
        entity: &'static str,
    },
    /// Connectivity failure; retryable.
    #[error("ledger store connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// Query or data integrity failure.
    #[error("ledger store query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
}

impl LedgerStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Driven port over the four ledger tables.
///
/// Every method is one atomic unit: implementations must guarantee that a
/// failure leaves no partial effect behind, and that balance checks are
/// performed under the same lock or guard as the writes they protect.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch the user's wallet, inserting an empty one if absent.
    /// Idempotent: repeated calls return the same wallet.
    async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, LedgerStoreError>;

    /// All transactions on the user's wallet, newest first.
    async fn transactions_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, LedgerStoreError>;

    /// Insert a pending deposit without touching the balance.
    async fn create_deposit(
        &self,
        user_id: UserId,
        amount: BigDecimal,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError>;

    /// Attach proof to the user's own pending deposit and move it to
    /// `verifying`.
    async fn attach_proof(
        &self,
        user_id: UserId,
        transaction_id: Uuid,
        proof_reference: String,
    ) -> Result<Transaction, LedgerStoreError>;

    /// Debit the wallet and insert the pending withdrawal in one unit.
    async fn create_withdrawal(
        &self,
        user_id: UserId,
        amount: BigDecimal,
        method: PaymentMethod,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError>;

    /// All `pending`/`verifying` transactions platform-wide, newest first.
    async fn pending_transactions(&self) -> Result<Vec<PendingTransaction>, LedgerStoreError>;

    /// Apply an escrow decision under a row lock: flip the status, stamp the
    /// deciding admin, and reconcile the wallet where the decision implies a
    /// credit.
    async fn decide_transaction(
        &self,
        transaction_id: Uuid,
        decision: Decision,
        admin_id: UserId,
        notes: Option<String>,
    ) -> Result<Transaction, LedgerStoreError>;

    /// Record an investment as one unit: insert the record, increment the
    /// project funding, recompute its status, debit the investor wallet.
    async fn record_investment(
        &self,
        investor_id: UserId,
        project_id: Uuid,
        amount: BigDecimal,
    ) -> Result<(Investment, ProjectFunding), LedgerStoreError>;

    /// All investments by the given investor, newest first.
    async fn investments_for_user(
        &self,
        investor_id: UserId,
    ) -> Result<Vec<Investment>, LedgerStoreError>;
}
