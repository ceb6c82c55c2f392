//! PostgreSQL persistence adapter built on Diesel.

pub mod diesel_ledger_store;
pub mod error_mapping;
pub mod migrations;
pub(crate) mod models;
pub mod pool;
pub mod schema;

pub use diesel_ledger_store::DieselLedgerStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
