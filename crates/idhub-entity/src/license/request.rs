//! License update request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use idhub_core::{AppError, AppResult};

use super::allocation::ResourceType;

/// Whether a change proposal grows or shrinks the allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "change_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    /// Add seats to the ceiling.
    Increase,
    /// Remove seats from the ceiling.
    Decrease,
}

impl fmt::Display for ChangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increase => write!(f, "increase"),
            Self::Decrease => write!(f, "decrease"),
        }
    }
}

/// Lifecycle state of a change proposal.
///
/// `Approved`, `Rejected`, and `Cancelled` are terminal: no transition
/// leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting one or more approval steps.
    Pending,
    /// All steps approved; allocation mutated.
    Approved,
    /// A step rejected the proposal.
    Rejected,
    /// Withdrawn by the requester or an administrator.
    Cancelled,
}

impl RequestStatus {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pending/approved/rejected/cancelled allocation change proposal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LicenseUpdateRequest {
    /// Unique request identifier.
    pub id: Uuid,
    /// Tenant whose allocation changes.
    pub tenant_id: Uuid,
    /// Tenant display name at request time.
    pub tenant_name: Option<String>,
    /// The resource whose allocation changes.
    pub resource_type: ResourceType,
    /// Grow or shrink.
    pub direction: ChangeDirection,
    /// Allocation count observed when the request was filed.
    pub current_count: i32,
    /// Seats added or removed.
    pub change_amount: i32,
    /// current_count ± change_amount, computed at creation and never
    /// clamped (flooring happens only when the allocation is applied).
    pub new_total: i32,
    /// Why the change is requested.
    pub reason: String,
    /// The actor who filed the request.
    pub requested_by: Option<Uuid>,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// Comments from the rejecting approver.
    pub rejection_reason: Option<String>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to file a new change proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLicenseRequest {
    /// Tenant whose allocation changes.
    pub tenant_id: Uuid,
    /// Tenant display name.
    pub tenant_name: Option<String>,
    /// The resource whose allocation changes.
    pub resource_type: ResourceType,
    /// Grow or shrink.
    pub direction: ChangeDirection,
    /// Allocation count observed by the requester.
    pub current_count: i32,
    /// Seats added or removed.
    pub change_amount: i32,
    /// Why the change is requested.
    pub reason: String,
    /// The actor filing the request.
    pub requested_by: Option<Uuid>,
}

impl NewLicenseRequest {
    /// Compute the proposed total. Decreases may go negative here; the
    /// floor is applied only when the allocation row is mutated.
    pub fn new_total(&self) -> i32 {
        match self.direction {
            ChangeDirection::Increase => self.current_count + self.change_amount,
            ChangeDirection::Decrease => self.current_count - self.change_amount,
        }
    }

    /// Reject proposals with missing or nonsensical fields.
    pub fn validate(&self) -> AppResult<()> {
        if self.reason.trim().is_empty() {
            return Err(AppError::validation("A reason is required"));
        }
        if self.change_amount <= 0 {
            return Err(AppError::validation("change_amount must be positive"));
        }
        if self.current_count < 0 {
            return Err(AppError::validation("current_count cannot be negative"));
        }
        Ok(())
    }
}
