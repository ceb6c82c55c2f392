//! Core ledger domain: entities, ports, and services.
//!
//! The domain layer is transport and storage agnostic. Adapters in
//! [`crate::inbound`] drive it through the port traits in [`ports`];
//! adapters in [`crate::outbound`] implement the [`ports::LedgerStore`]
//! driven port.

pub mod error;
pub mod investment;
pub mod ledger_service;
pub mod memory_store;
pub mod ports;
pub mod principal;
pub mod transaction;
pub mod wallet;

pub use error::{Error, ErrorCode};
pub use investment::{Investment, ProjectFunding, ProjectStatus};
pub use ledger_service::LedgerService;
pub use memory_store::InMemoryLedgerStore;
pub use ports::{
    DecisionRequest, DepositRequest, EscrowWorkflow, InvestRequest, InvestmentLedger,
    InvestmentReceipt, LedgerStore, LedgerStoreError, PendingTransaction, ProofRequest,
    TransactionCommand, WalletQuery, WithdrawalRequest,
};
pub use principal::{Principal, Role, UserId};
pub use transaction::{
    Decision, PaymentMethod, Transaction, TransactionKind, TransactionStatus,
};
pub use wallet::Wallet;
