//! License approval step entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::request::RequestStatus;

/// Decision state of one approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "step_decision", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StepDecision {
    /// Not yet decided.
    Pending,
    /// Approved by the stage's decider.
    Approved,
    /// Rejected by the stage's decider.
    Rejected,
}

impl fmt::Display for StepDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// One ordered approval step for a change proposal.
///
/// Steps for a request are totally ordered by creation time; the earliest
/// row still `Pending` is the current step, which enforces strict
/// sequential approval even when rows are queried out of order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LicenseUpdateApproval {
    /// Unique approval identifier.
    pub id: Uuid,
    /// The request this step belongs to.
    pub request_id: Uuid,
    /// Organizational checkpoint label (e.g. `"sales"`, `"finance"`, `"ceo"`).
    pub stage: String,
    /// Decision recorded for this step.
    pub decision: StepDecision,
    /// The actor who decided.
    pub decided_by: Option<Uuid>,
    /// Approver comments; propagated as the rejection reason on reject.
    pub comments: Option<String>,
    /// When the decision was recorded.
    pub decided_at: Option<DateTime<Utc>>,
    /// Mirrors the request status so cancelled steps stay distinguishable.
    pub status: RequestStatus,
    /// When the step was created (defines step order).
    pub created_at: DateTime<Utc>,
}

impl LicenseUpdateApproval {
    /// Whether this step is still awaiting a decision.
    pub fn is_pending(&self) -> bool {
        self.decision == StepDecision::Pending && self.status == RequestStatus::Pending
    }
}
