//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Per-user wallets.
    ///
    /// One row per platform user, created lazily on first financial action.
    /// A `CHECK (balance >= 0)` constraint backs the domain invariant.
    wallets (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user (unique).
        user_id -> Uuid,
        /// Current balance; NUMERIC to avoid binary rounding.
        balance -> Numeric,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Deposit and withdrawal transactions.
    transactions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning wallet.
        wallet_id -> Uuid,
        /// `deposit` or `withdrawal`.
        kind -> Varchar,
        /// `pending`, `verifying`, `completed`, or `rejected`.
        status -> Varchar,
        /// Positive amount; `CHECK (amount > 0)`.
        amount -> Numeric,
        /// `bank_transfer`, `mobile_money`, or `card`.
        payment_method -> Varchar,
        /// Opaque reference to uploaded proof of payment.
        proof_of_payment -> Nullable<Varchar>,
        /// Free-text notes.
        notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Escrow officer who settled the transaction.
        processed_by -> Nullable<Uuid>,
        /// When the transaction was settled.
        processed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Immutable investment records.
    investments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Investing user.
        investor_id -> Uuid,
        /// Funded project.
        project_id -> Uuid,
        /// Positive amount; `CHECK (amount > 0)`.
        amount -> Numeric,
        /// Record creation timestamp.
        invested_at -> Timestamptz,
    }
}

diesel::table! {
    /// Funding state of projects, owned by the ledger.
    projects (id) {
        /// Primary key: project UUID.
        id -> Uuid,
        /// Target amount fixed at project creation.
        funding_goal -> Numeric,
        /// Sum of accepted investments.
        current_funding -> Numeric,
        /// `SeekingFunding`, `PartiallyFunded`, or `FullyFunded`.
        status -> Varchar,
    }
}

diesel::joinable!(transactions -> wallets (wallet_id));
diesel::joinable!(investments -> projects (project_id));

diesel::allow_tables_to_appear_in_same_query!(wallets, transactions, investments, projects);
