//! License approval engine: ordered multi-stage approval with atomic
//! allocation mutation.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use idhub_core::error::AppError;
use idhub_core::result::AppResult;
use idhub_entity::audit::AuditEvent;
use idhub_entity::directory::DirectoryProvider;
use idhub_entity::license::{
    ApprovalStore, DecisionApplied, LicenseAllocation, LicenseUpdateRequest, NewLicenseRequest,
    ResourceType, StepDecision,
};

use crate::audit::AuditHandle;
use crate::context::RequestContext;

/// Default approval chain when a tenant has none configured.
const DEFAULT_STAGE: &str = "ceo";

/// Outcome of one decision call, for the caller's notification flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The request is terminally rejected.
    Rejected,
    /// The request stays pending; this stage decides next.
    AwaitingNextStage {
        /// Stage label of the next pending step.
        next_stage: String,
    },
    /// The request is approved and the allocation has been mutated.
    Approved {
        /// The allocation ceiling after the mutation.
        new_allocated_count: i32,
    },
}

/// Drives license-change requests through their ordered approval stages.
///
/// The engine owns the guards and authorization; the store owns the row
/// locks. Decisions are linearized per request by the store transaction,
/// so two concurrent final approvals apply the allocation delta exactly
/// once.
#[derive(Debug, Clone)]
pub struct LicenseApprovalEngine {
    /// Workflow persistence.
    store: Arc<dyn ApprovalStore>,
    /// Stage-membership and approval-chain reads.
    directory: Arc<dyn DirectoryProvider>,
    /// Fire-and-forget audit.
    audit: AuditHandle,
}

impl LicenseApprovalEngine {
    /// Creates a new engine.
    pub fn new(
        store: Arc<dyn ApprovalStore>,
        directory: Arc<dyn DirectoryProvider>,
        audit: AuditHandle,
    ) -> Self {
        Self {
            store,
            directory,
            audit,
        }
    }

    /// File a new change proposal.
    ///
    /// Loads the tenant's configured approval levels — defaulting to a
    /// single CEO stage — and creates the request plus one pending step
    /// per level in one atomic unit, preserving level order.
    pub async fn create(&self, data: NewLicenseRequest) -> AppResult<LicenseUpdateRequest> {
        data.validate()?;

        let levels = self.directory.approval_levels(data.tenant_id).await?;
        let stages: Vec<String> = if levels.is_empty() {
            vec![DEFAULT_STAGE.to_string()]
        } else {
            levels
                .iter()
                .map(|level| level.stage_label().to_lowercase())
                .collect()
        };

        let tenant_id = data.tenant_id;
        let requested_by = data.requested_by;
        let request = self.store.create_request(data, stages).await?;

        self.audit.dispatch(
            AuditEvent::new("license.request_created")
                .tenant(tenant_id)
                .resource("license_update_request")
                .metadata(json!({
                    "request_id": request.id,
                    "direction": request.direction.to_string(),
                    "change_amount": request.change_amount,
                    "requested_by": requested_by,
                })),
        );

        info!(request_id = %request.id, tenant_id = %tenant_id, "License request created");
        Ok(request)
    }

    /// Record a decision on the current pending step.
    ///
    /// The current step is always the earliest-created approval row still
    /// pending. The decider must belong to the organizational unit named
    /// by that step's stage.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        decision: StepDecision,
        comments: Option<String>,
    ) -> AppResult<DecisionOutcome> {
        if decision == StepDecision::Pending {
            return Err(AppError::validation(
                "Decision must be 'approved' or 'rejected'",
            ));
        }

        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.status.is_terminal() {
            return Err(AppError::already_decided(format!(
                "Request already {}",
                request.status
            )));
        }

        let step = self
            .store
            .current_pending_step(request_id)
            .await?
            .ok_or_else(|| AppError::invalid_state("No pending approval step"))?;

        if !self
            .directory
            .is_member_of_stage(ctx.actor_id, &step.stage)
            .await?
        {
            return Err(AppError::forbidden(
                "Caller is not authorized to decide this approval stage",
            ));
        }

        let applied = self
            .store
            .record_decision(request_id, step.id, ctx.actor_id, decision, comments.clone())
            .await?;

        let step_action = match decision {
            StepDecision::Approved => "license.approval_approved",
            StepDecision::Rejected => "license.approval_rejected",
            StepDecision::Pending => unreachable!(),
        };
        self.audit.dispatch(
            AuditEvent::new(step_action)
                .actor(ctx.actor_id, ctx.kind)
                .tenant(request.tenant_id)
                .resource("license_update_approval")
                .metadata(json!({
                    "request_id": request_id,
                    "approval_id": step.id,
                    "stage": step.stage,
                    "comments": comments,
                })),
        );

        let outcome = match applied {
            DecisionApplied::Rejected => {
                self.audit.dispatch(
                    AuditEvent::new("license.request_rejected")
                        .actor(ctx.actor_id, ctx.kind)
                        .tenant(request.tenant_id)
                        .resource("license_update_request")
                        .metadata(json!({ "request_id": request_id })),
                );
                DecisionOutcome::Rejected
            }
            DecisionApplied::Advanced { next_stage } => {
                DecisionOutcome::AwaitingNextStage { next_stage }
            }
            DecisionApplied::Finalized {
                new_allocated_count,
            } => {
                self.audit.dispatch(
                    AuditEvent::new("license.request_approved")
                        .actor(ctx.actor_id, ctx.kind)
                        .tenant(request.tenant_id)
                        .resource("license_update_request")
                        .metadata(json!({ "request_id": request_id })),
                );
                self.audit.dispatch(
                    AuditEvent::new("license.allocation_updated")
                        .tenant(request.tenant_id)
                        .resource("license_allocation")
                        .metadata(json!({
                            "request_id": request_id,
                            "change": request.change_amount,
                            "new_allocated_count": new_allocated_count,
                        })),
                );
                DecisionOutcome::Approved {
                    new_allocated_count,
                }
            }
        };

        info!(
            request_id = %request_id,
            decider = %ctx.actor_id,
            decision = %decision,
            "License approval decision recorded"
        );
        Ok(outcome)
    }

    /// Withdraw a pending request.
    ///
    /// Allowed only for the original requester or an administrative
    /// caller, and only while the request is still pending.
    pub async fn cancel(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<()> {
        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.status.is_terminal() {
            return Err(AppError::invalid_state(format!(
                "Cannot cancel a request in status {}",
                request.status
            )));
        }

        if !ctx.is_admin() && request.requested_by != Some(ctx.actor_id) {
            return Err(AppError::forbidden("Not allowed to cancel this request"));
        }

        self.store.cancel_request(request_id).await?;

        self.audit.dispatch(
            AuditEvent::new("license.request_cancelled")
                .actor(ctx.actor_id, ctx.kind)
                .tenant(request.tenant_id)
                .resource("license_update_request")
                .metadata(json!({ "request_id": request_id })),
        );

        info!(request_id = %request_id, by = %ctx.actor_id, "License request cancelled");
        Ok(())
    }

    /// Current allocation for a (tenant, resource) pair.
    pub async fn allocation(
        &self,
        tenant_id: Uuid,
        resource_type: ResourceType,
    ) -> AppResult<Option<LicenseAllocation>> {
        self.store.find_allocation(tenant_id, resource_type).await
    }
}
