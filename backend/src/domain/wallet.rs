//! Wallet aggregate: one balance per platform user.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::principal::UserId;

/// Per-user balance record.
///
/// ## Invariants
/// - `balance >= 0` after every committed operation. Constructors reject
///   negative balances; mutations happen through the ledger store's atomic
///   conditional updates so a committed wallet can never go negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    id: Uuid,
    user_id: UserId,
    balance: BigDecimal,
    created_at: DateTime<Utc>,
}

/// Validation failures raised when constructing a [`Wallet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletValidationError {
    /// Balance was negative.
    #[error("wallet balance must not be negative")]
    NegativeBalance,
}

impl Wallet {
    /// Construct a wallet, rejecting negative balances.
    pub fn new(
        id: Uuid,
        user_id: UserId,
        balance: BigDecimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, WalletValidationError> {
        if balance < BigDecimal::from(0) {
            return Err(WalletValidationError::NegativeBalance);
        }
        Ok(Self {
            id,
            user_id,
            balance,
            created_at,
        })
    }

    /// Fresh empty wallet for a user's first financial action.
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            balance: BigDecimal::from(0),
            created_at: now,
        }
    }

    /// Wallet identifier.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user.
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Current balance.
    pub const fn balance(&self) -> &BigDecimal {
        &self.balance
    }

    /// Creation timestamp.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the balance covers `amount`.
    pub fn covers(&self, amount: &BigDecimal) -> bool {
        self.balance >= *amount
    }

    /// Wallet with `amount` added.
    #[must_use]
    pub fn credited(&self, amount: &BigDecimal) -> Self {
        Self {
            balance: &self.balance + amount,
            ..self.clone()
        }
    }

    /// Wallet with `amount` removed, or `None` when the balance would go
    /// negative. Mirrors the store's `balance >= amount` debit guard.
    pub fn debited(&self, amount: &BigDecimal) -> Option<Self> {
        if !self.covers(amount) {
            return None;
        }
        Some(Self {
            balance: &self.balance - amount,
            ..self.clone()
        })
    }
}
