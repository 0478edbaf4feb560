//! License workflow persistence seam.

use async_trait::async_trait;
use uuid::Uuid;

use idhub_core::result::AppResult;

use super::allocation::{LicenseAllocation, ResourceType};
use super::approval::{LicenseUpdateApproval, StepDecision};
use super::request::{LicenseUpdateRequest, NewLicenseRequest};

/// What an applied decision did to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionApplied {
    /// The step rejected; the request is now terminal REJECTED.
    Rejected,
    /// The step approved and at least one step is still pending; the
    /// request stays PENDING and this stage is next.
    Advanced {
        /// Stage label of the next pending step.
        next_stage: String,
    },
    /// The final step approved; the request is APPROVED and the
    /// allocation was mutated in the same transaction.
    Finalized {
        /// The allocation ceiling after the mutation.
        new_allocated_count: i32,
    },
}

/// Persistence operations for the license approval workflow.
///
/// `create_request`, `record_decision`, and `cancel_request` are each one
/// atomic unit. `record_decision` must re-check its guards under row locks
/// so that two concurrent decisions on the same step resolve to exactly
/// one winner and at most one allocation mutation.
#[async_trait]
pub trait ApprovalStore: Send + Sync + std::fmt::Debug + 'static {
    /// Atomically create the request plus one PENDING approval row per
    /// stage, preserving stage order as creation order.
    async fn create_request(
        &self,
        data: NewLicenseRequest,
        stages: Vec<String>,
    ) -> AppResult<LicenseUpdateRequest>;

    /// Find a request by id.
    async fn find_request(&self, id: Uuid) -> AppResult<Option<LicenseUpdateRequest>>;

    /// All approval steps for a request, ordered by creation.
    async fn approvals_for(&self, request_id: Uuid) -> AppResult<Vec<LicenseUpdateApproval>>;

    /// The earliest-created approval step still pending for a request.
    async fn current_pending_step(
        &self,
        request_id: Uuid,
    ) -> AppResult<Option<LicenseUpdateApproval>>;

    /// Atomically record the decision on the given step and advance the
    /// request state machine.
    ///
    /// Inside the transaction the implementation must verify that the
    /// request is still PENDING (else `AlreadyDecided`) and that the step
    /// is still the earliest pending one (else `Conflict`). On final
    /// approval the matching allocation row is mutated in the same
    /// transaction: increases add `change_amount`; decreases subtract it
    /// flooring at zero, and are rejected with `Conflict` when the result
    /// would drop below `used_count`. A missing allocation row fails the
    /// decision with `InvalidState`, leaving the request PENDING.
    async fn record_decision(
        &self,
        request_id: Uuid,
        approval_id: Uuid,
        decided_by: Uuid,
        decision: StepDecision,
        comments: Option<String>,
    ) -> AppResult<DecisionApplied>;

    /// Atomically cancel a PENDING request and mark its still-pending
    /// steps CANCELLED. Fails with `InvalidState` when the request is no
    /// longer pending.
    async fn cancel_request(&self, request_id: Uuid) -> AppResult<()>;

    /// Find the allocation row for a (tenant, resource) pair.
    async fn find_allocation(
        &self,
        tenant_id: Uuid,
        resource_type: ResourceType,
    ) -> AppResult<Option<LicenseAllocation>>;
}
