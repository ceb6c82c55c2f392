//! Deposit and withdrawal transactions with their verification state machine.
//!
//! Deposits and withdrawals move through different lifecycles:
//!
//! ```text
//! deposit:    pending -> verifying -> {completed, rejected}
//!             pending -> {completed, rejected}        (direct admin decision)
//! withdrawal: pending -> {completed, rejected}
//! ```
//!
//! Terminal states are final. The helpers on [`Transaction`] are the single
//! source of truth for legal transitions; the SQL adapter enforces the same
//! rules with guarded updates under row locks.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::principal::UserId;

/// Direction of a wallet-affecting transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money entering the wallet once verified.
    Deposit,
    /// Money leaving the wallet, reserved at creation time.
    Withdrawal,
}

impl TransactionKind {
    /// Canonical lowercase name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored transaction kind is unrecognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction kind: {0}")]
pub struct UnknownTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(UnknownTransactionKind(other.to_owned())),
        }
    }
}

/// Lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Created, awaiting proof or an admin decision.
    Pending,
    /// Deposit with proof attached, awaiting verification.
    Verifying,
    /// Approved by an escrow officer. Terminal.
    Completed,
    /// Rejected by an escrow officer. Terminal.
    Rejected,
}

impl TransactionStatus {
    /// Whether no further transitions are permitted.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Canonical lowercase name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verifying => "verifying",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored transaction status is unrecognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction status: {0}")]
pub struct UnknownTransactionStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownTransactionStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verifying" => Ok(Self::Verifying),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownTransactionStatus(other.to_owned())),
        }
    }
}

/// Payment rail named when a deposit or withdrawal is requested.
///
/// Metadata only; the ledger never talks to a payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Manual bank transfer with uploaded proof.
    BankTransfer,
    /// Mobile money operator.
    MobileMoney,
    /// Card payment.
    Card,
}

impl PaymentMethod {
    /// Canonical snake_case name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::MobileMoney => "mobile_money",
            Self::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a payment method name is unrecognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(Self::BankTransfer),
            "mobile_money" => Ok(Self::MobileMoney),
            "card" => Ok(Self::Card),
            other => Err(UnknownPaymentMethod(other.to_owned())),
        }
    }
}

/// Terminal decision taken by an escrow officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Complete the transaction.
    Approve,
    /// Reject the transaction.
    Reject,
}

impl Decision {
    /// Status the transaction lands in after this decision.
    pub const fn resulting_status(self) -> TransactionStatus {
        match self {
            Self::Approve => TransactionStatus::Completed,
            Self::Reject => TransactionStatus::Rejected,
        }
    }
}

/// Error returned when a decision action name is unrecognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown decision action: {0}")]
pub struct UnknownDecision(pub String);

impl FromStr for Decision {
    type Err = UnknownDecision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(UnknownDecision(other.to_owned())),
        }
    }
}

/// A single wallet-affecting event tracked through verification.
///
/// ## Invariants
/// - `amount > 0`, enforced at creation by the ledger service.
/// - `processed_by`/`processed_at` are set exactly when the status is
///   terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Transaction identifier.
    pub id: Uuid,
    /// Owning wallet.
    pub wallet_id: Uuid,
    /// Deposit or withdrawal.
    pub kind: TransactionKind,
    /// Current lifecycle state.
    pub status: TransactionStatus,
    /// Positive amount being moved.
    pub amount: BigDecimal,
    /// Payment rail named by the requester.
    pub payment_method: PaymentMethod,
    /// Opaque reference to uploaded proof of payment, if any.
    pub proof_of_payment: Option<String>,
    /// Free-text notes; replaced by the decision notes when an admin
    /// supplies them.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Escrow officer who took the terminal decision.
    pub processed_by: Option<UserId>,
    /// When the terminal decision was taken.
    pub processed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether proof of payment may be attached: only pending deposits.
    pub const fn accepts_proof(&self) -> bool {
        matches!(
            (self.kind, self.status),
            (TransactionKind::Deposit, TransactionStatus::Pending)
        )
    }

    /// Whether an escrow decision is legal from the current state.
    ///
    /// Withdrawals are only decidable from `pending`; deposits also from
    /// `verifying`. The direct `pending -> terminal` shortcut for deposits is
    /// intentional: proof upload is not a prerequisite for a decision.
    pub const fn is_decidable(&self) -> bool {
        match self.status {
            TransactionStatus::Pending => true,
            TransactionStatus::Verifying => matches!(self.kind, TransactionKind::Deposit),
            TransactionStatus::Completed | TransactionStatus::Rejected => false,
        }
    }

    /// Wallet credit implied by a decision, if any.
    ///
    /// An approved deposit credits the wallet with the verified amount. A
    /// rejected withdrawal refunds the debit reserved at creation. The other
    /// two outcomes leave the wallet untouched: an approved withdrawal
    /// already left the wallet, and a rejected deposit never entered it.
    pub fn credit_on(&self, decision: Decision) -> Option<&BigDecimal> {
        match (self.kind, decision) {
            (TransactionKind::Deposit, Decision::Approve)
            | (TransactionKind::Withdrawal, Decision::Reject) => Some(&self.amount),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn transaction(kind: TransactionKind, status: TransactionStatus) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            kind,
            status,
            amount: BigDecimal::from(500),
            payment_method: PaymentMethod::BankTransfer,
            proof_of_payment: None,
            notes: None,
            created_at: Utc::now(),
            processed_by: None,
            processed_at: None,
        }
    }

    #[rstest]
    #[case(TransactionKind::Deposit, TransactionStatus::Pending, true)]
    #[case(TransactionKind::Deposit, TransactionStatus::Verifying, true)]
    #[case(TransactionKind::Deposit, TransactionStatus::Completed, false)]
    #[case(TransactionKind::Deposit, TransactionStatus::Rejected, false)]
    #[case(TransactionKind::Withdrawal, TransactionStatus::Pending, true)]
    #[case(TransactionKind::Withdrawal, TransactionStatus::Verifying, false)]
    #[case(TransactionKind::Withdrawal, TransactionStatus::Completed, false)]
    #[case(TransactionKind::Withdrawal, TransactionStatus::Rejected, false)]
    fn decidable_matrix(
        #[case] kind: TransactionKind,
        #[case] status: TransactionStatus,
        #[case] decidable: bool,
    ) {
        assert_eq!(transaction(kind, status).is_decidable(), decidable);
    }

    #[rstest]
    #[case(TransactionKind::Deposit, TransactionStatus::Pending, true)]
    #[case(TransactionKind::Deposit, TransactionStatus::Verifying, false)]
    #[case(TransactionKind::Withdrawal, TransactionStatus::Pending, false)]
    fn proof_only_on_pending_deposits(
        #[case] kind: TransactionKind,
        #[case] status: TransactionStatus,
        #[case] accepted: bool,
    ) {
        assert_eq!(transaction(kind, status).accepts_proof(), accepted);
    }

    #[rstest]
    #[case(TransactionKind::Deposit, Decision::Approve, true)]
    #[case(TransactionKind::Deposit, Decision::Reject, false)]
    #[case(TransactionKind::Withdrawal, Decision::Approve, false)]
    #[case(TransactionKind::Withdrawal, Decision::Reject, true)]
    fn wallet_credit_matrix(
        #[case] kind: TransactionKind,
        #[case] decision: Decision,
        #[case] credits: bool,
    ) {
        let txn = transaction(kind, TransactionStatus::Pending);
        assert_eq!(txn.credit_on(decision).is_some(), credits);
    }

    #[rstest]
    fn status_names_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Verifying,
            TransactionStatus::Completed,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<TransactionStatus>(), Ok(status));
        }
    }
}
