//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    EscrowWorkflow, InvestmentLedger, TransactionCommand, WalletQuery,
};
use crate::domain::{LedgerService, LedgerStore};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub wallet: Arc<dyn WalletQuery>,
    pub transactions: Arc<dyn TransactionCommand>,
    pub escrow: Arc<dyn EscrowWorkflow>,
    pub investments: Arc<dyn InvestmentLedger>,
}

impl HttpState {
    /// Wire every port to a single ledger service instance.
    pub fn from_service<S>(service: LedgerService<S>) -> Self
    where
        S: LedgerStore + 'static,
    {
        let service = Arc::new(service);
        Self {
            wallet: service.clone(),
            transactions: service.clone(),
            escrow: service.clone(),
            investments: service,
        }
    }
}
