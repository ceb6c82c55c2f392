//! Ledger and escrow service for the crowdfunding platform.
//!
//! The crate follows a hexagonal layout: `domain` holds the ledger rules and
//! port traits, `inbound` adapts HTTP requests onto those ports, `outbound`
//! implements persistence, and `server` assembles the pieces.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
