//! Investment records and the project funding state they mutate.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::principal::UserId;

/// Funding lifecycle of a project as seen by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// No investments recorded yet.
    SeekingFunding,
    /// Some funding received, goal not yet met.
    PartiallyFunded,
    /// `current_funding >= funding_goal`; no longer investable.
    FullyFunded,
}

impl ProjectStatus {
    /// Whether the project accepts new investments.
    pub const fn is_fundable(self) -> bool {
        matches!(self, Self::SeekingFunding | Self::PartiallyFunded)
    }

    /// Canonical name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SeekingFunding => "SeekingFunding",
            Self::PartiallyFunded => "PartiallyFunded",
            Self::FullyFunded => "FullyFunded",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored project status is unrecognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown project status: {0}")]
pub struct UnknownProjectStatus(pub String);

impl FromStr for ProjectStatus {
    type Err = UnknownProjectStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SeekingFunding" => Ok(Self::SeekingFunding),
            "PartiallyFunded" => Ok(Self::PartiallyFunded),
            "FullyFunded" => Ok(Self::FullyFunded),
            other => Err(UnknownProjectStatus(other.to_owned())),
        }
    }
}

/// The funding fields of a project that the ledger owns.
///
/// The rest of the project entity (title, milestones, owner) lives with the
/// project metadata service; the ledger only reads the goal and writes
/// `current_funding`/`status` inside the atomic investment unit.
///
/// ## Invariants
/// - `current_funding` is monotonically non-decreasing.
/// - Overshoot past `funding_goal` is allowed; the status simply becomes
///   [`ProjectStatus::FullyFunded`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFunding {
    /// Project identifier.
    pub project_id: Uuid,
    /// Target amount fixed at project creation.
    pub funding_goal: BigDecimal,
    /// Sum of accepted investments.
    pub current_funding: BigDecimal,
    /// Derived lifecycle state.
    pub status: ProjectStatus,
}

impl ProjectFunding {
    /// Funding state with `amount` accepted and the status recomputed.
    #[must_use]
    pub fn accepted(&self, amount: &BigDecimal) -> Self {
        let current_funding = &self.current_funding + amount;
        let status = if current_funding >= self.funding_goal {
            ProjectStatus::FullyFunded
        } else {
            ProjectStatus::PartiallyFunded
        };
        Self {
            project_id: self.project_id,
            funding_goal: self.funding_goal.clone(),
            current_funding,
            status,
        }
    }
}

/// Immutable record of capital allocated by an investor to a project.
///
/// Created atomically with the matching wallet debit and funding increment;
/// there is no update or delete path.
#[derive(Debug, Clone, PartialEq)]
pub struct Investment {
    /// Investment identifier.
    pub id: Uuid,
    /// Investing user.
    pub investor_id: UserId,
    /// Funded project.
    pub project_id: Uuid,
    /// Positive amount moved from the wallet to the project.
    pub amount: BigDecimal,
    /// When the investment was recorded.
    pub invested_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn funding() -> ProjectFunding {
        ProjectFunding {
            project_id: Uuid::new_v4(),
            funding_goal: BigDecimal::from(50_000),
            current_funding: BigDecimal::from(49_000),
            status: ProjectStatus::PartiallyFunded,
        }
    }

    #[rstest]
    fn reaching_the_goal_marks_fully_funded(funding: ProjectFunding) {
        let updated = funding.accepted(&BigDecimal::from(1000));
        assert_eq!(updated.current_funding, BigDecimal::from(50_000));
        assert_eq!(updated.status, ProjectStatus::FullyFunded);
    }

    #[rstest]
    fn overshoot_is_allowed(funding: ProjectFunding) {
        let updated = funding.accepted(&BigDecimal::from(5000));
        assert_eq!(updated.current_funding, BigDecimal::from(54_000));
        assert_eq!(updated.status, ProjectStatus::FullyFunded);
    }

    #[rstest]
    fn partial_funding_below_goal(funding: ProjectFunding) {
        let updated = funding.accepted(&BigDecimal::from(100));
        assert_eq!(updated.current_funding, BigDecimal::from(49_100));
        assert_eq!(updated.status, ProjectStatus::PartiallyFunded);
    }

    #[rstest]
    #[case(ProjectStatus::SeekingFunding, true)]
    #[case(ProjectStatus::PartiallyFunded, true)]
    #[case(ProjectStatus::FullyFunded, false)]
    fn fundable_states(#[case] status: ProjectStatus, #[case] fundable: bool) {
        assert_eq!(status.is_fundable(), fundable);
    }
}
