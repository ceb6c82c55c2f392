//! Authenticated principal supplied by the upstream gateway.
//!
//! The ledger never validates credentials itself; it trusts the
//! `{principal id, role}` pair attached to every request by the
//! authentication layer in front of it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque identifier of a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Platform role attached to a principal by the authentication gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Funds projects from their wallet.
    Investor,
    /// Submits projects; holds a wallet for received funds.
    Innovator,
    /// Full administrative access, including escrow decisions.
    Admin,
    /// Restricted administrative role limited to escrow decisions.
    EscrowManager,
}

impl Role {
    /// Whether this role may list and decide pending transactions.
    pub const fn can_decide_transactions(self) -> bool {
        matches!(self, Self::Admin | Self::EscrowManager)
    }

    /// Canonical role name as used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Investor => "Investor",
            Self::Innovator => "Innovator",
            Self::Admin => "Admin",
            Self::EscrowManager => "EscrowManager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Investor" => Ok(Self::Investor),
            "Innovator" => Ok(Self::Innovator),
            "Admin" => Ok(Self::Admin),
            "EscrowManager" => Ok(Self::EscrowManager),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Authenticated caller identity as asserted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// Stable user identifier.
    pub id: UserId,
    /// Role granted by the platform.
    pub role: Role,
}

impl Principal {
    /// Construct a principal from its parts.
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Investor", Role::Investor)]
    #[case("Innovator", Role::Innovator)]
    #[case("Admin", Role::Admin)]
    #[case("EscrowManager", Role::EscrowManager)]
    fn role_round_trips(#[case] name: &str, #[case] role: Role) {
        assert_eq!(name.parse::<Role>(), Ok(role));
        assert_eq!(role.as_str(), name);
    }

    #[rstest]
    fn unknown_role_is_rejected() {
        let err = "Auditor".parse::<Role>().expect_err("unknown role");
        assert_eq!(err, UnknownRole("Auditor".to_owned()));
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::EscrowManager, true)]
    #[case(Role::Investor, false)]
    #[case(Role::Innovator, false)]
    fn escrow_decisions_are_restricted(#[case] role: Role, #[case] allowed: bool) {
        assert_eq!(role.can_decide_transactions(), allowed);
    }
}
