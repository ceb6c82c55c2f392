//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod error;
pub mod escrow;
pub mod health;
pub mod investments;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod transactions;
pub mod validation;
pub mod wallet;

pub use error::ApiResult;
