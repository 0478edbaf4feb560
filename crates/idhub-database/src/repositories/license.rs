//! License workflow store implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::license::{
    ApprovalStore, ChangeDirection, DecisionApplied, LicenseAllocation, LicenseUpdateApproval,
    LicenseUpdateRequest, NewLicenseRequest, ResourceType, StepDecision,
};

/// PostgreSQL-backed license workflow store.
///
/// Request creation, decision recording, and cancellation each run in one
/// transaction. `record_decision` re-checks its guards under `FOR UPDATE`
/// row locks so concurrent decisions on the same step resolve to exactly
/// one winner and the allocation delta is applied at most once.
#[derive(Debug, Clone)]
pub struct PgApprovalStore {
    pool: PgPool,
}

impl PgApprovalStore {
    /// Create a new license workflow store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn db_err(context: &'static str, e: sqlx::Error) -> AppError {
        AppError::with_source(ErrorKind::Database, context, e)
    }

    async fn lock_request(
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
    ) -> AppResult<Option<LicenseUpdateRequest>> {
        sqlx::query_as::<_, LicenseUpdateRequest>(
            "SELECT * FROM license_update_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| Self::db_err("Failed to lock request", e))
    }

    async fn lock_earliest_pending_step(
        tx: &mut Transaction<'_, Postgres>,
        request_id: Uuid,
    ) -> AppResult<Option<LicenseUpdateApproval>> {
        sqlx::query_as::<_, LicenseUpdateApproval>(
            "SELECT * FROM license_update_approvals \
             WHERE request_id = $1 AND decision = 'pending' AND status = 'pending' \
             ORDER BY created_at ASC LIMIT 1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| Self::db_err("Failed to lock pending step", e))
    }
}

#[async_trait]
impl ApprovalStore for PgApprovalStore {
    async fn create_request(
        &self,
        data: NewLicenseRequest,
        stages: Vec<String>,
    ) -> AppResult<LicenseUpdateRequest> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_err("Failed to begin create transaction", e))?;

        let request = sqlx::query_as::<_, LicenseUpdateRequest>(
            "INSERT INTO license_update_requests \
             (tenant_id, tenant_name, resource_type, direction, current_count, change_amount, \
              new_total, reason, requested_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.tenant_id)
        .bind(&data.tenant_name)
        .bind(data.resource_type)
        .bind(data.direction)
        .bind(data.current_count)
        .bind(data.change_amount)
        .bind(data.new_total())
        .bind(&data.reason)
        .bind(data.requested_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to create request", e))?;

        // NOW() is transaction-stable; steps need distinct timestamps to
        // keep the earliest-pending ordering meaningful.
        for stage in &stages {
            sqlx::query(
                "INSERT INTO license_update_approvals (request_id, stage, created_at) \
                 VALUES ($1, $2, clock_timestamp())",
            )
            .bind(request.id)
            .bind(stage)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::db_err("Failed to create approval step", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| Self::db_err("Failed to commit create transaction", e))?;

        Ok(request)
    }

    async fn find_request(&self, id: Uuid) -> AppResult<Option<LicenseUpdateRequest>> {
        sqlx::query_as::<_, LicenseUpdateRequest>(
            "SELECT * FROM license_update_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to find request", e))
    }

    async fn approvals_for(&self, request_id: Uuid) -> AppResult<Vec<LicenseUpdateApproval>> {
        sqlx::query_as::<_, LicenseUpdateApproval>(
            "SELECT * FROM license_update_approvals WHERE request_id = $1 ORDER BY created_at ASC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to list approvals", e))
    }

    async fn current_pending_step(
        &self,
        request_id: Uuid,
    ) -> AppResult<Option<LicenseUpdateApproval>> {
        sqlx::query_as::<_, LicenseUpdateApproval>(
            "SELECT * FROM license_update_approvals \
             WHERE request_id = $1 AND decision = 'pending' AND status = 'pending' \
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to find pending step", e))
    }

    async fn record_decision(
        &self,
        request_id: Uuid,
        approval_id: Uuid,
        decided_by: Uuid,
        decision: StepDecision,
        comments: Option<String>,
    ) -> AppResult<DecisionApplied> {
        if decision == StepDecision::Pending {
            return Err(AppError::validation("A decision cannot be 'pending'"));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_err("Failed to begin decide transaction", e))?;

        let request = Self::lock_request(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.status.is_terminal() {
            return Err(AppError::already_decided(format!(
                "Request already {}",
                request.status
            )));
        }

        let step = Self::lock_earliest_pending_step(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::invalid_state("No pending approval step"))?;

        if step.id != approval_id {
            return Err(AppError::conflict(
                "The current approval step changed; reload and retry",
            ));
        }

        let step_status = match decision {
            StepDecision::Approved => "approved",
            StepDecision::Rejected => "rejected",
            StepDecision::Pending => unreachable!(),
        };

        sqlx::query(
            "UPDATE license_update_approvals \
             SET decision = $2, status = $3::request_status, decided_by = $4, comments = $5, \
                 decided_at = NOW() \
             WHERE id = $1",
        )
        .bind(step.id)
        .bind(decision)
        .bind(step_status)
        .bind(decided_by)
        .bind(&comments)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to record step decision", e))?;

        if decision == StepDecision::Rejected {
            let reason = comments.unwrap_or_else(|| "Rejected by approver".to_string());
            sqlx::query(
                "UPDATE license_update_requests \
                 SET status = 'rejected', rejection_reason = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(request_id)
            .bind(&reason)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::db_err("Failed to reject request", e))?;

            tx.commit()
                .await
                .map_err(|e| Self::db_err("Failed to commit decide transaction", e))?;
            return Ok(DecisionApplied::Rejected);
        }

        if let Some(next) = Self::lock_earliest_pending_step(&mut tx, request_id).await? {
            tx.commit()
                .await
                .map_err(|e| Self::db_err("Failed to commit decide transaction", e))?;
            return Ok(DecisionApplied::Advanced {
                next_stage: next.stage,
            });
        }

        // Final approval: mutate the allocation in the same transaction.
        let allocation = sqlx::query_as::<_, LicenseAllocation>(
            "SELECT * FROM license_allocations \
             WHERE tenant_id = $1 AND resource_type = $2 FOR UPDATE",
        )
        .bind(request.tenant_id)
        .bind(request.resource_type)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to lock allocation", e))?
        .ok_or_else(|| {
            AppError::invalid_state(
                "No allocation exists for this tenant and resource; decision not applied",
            )
        })?;

        let new_allocated = match request.direction {
            ChangeDirection::Increase => allocation.allocated_count + request.change_amount,
            ChangeDirection::Decrease => (allocation.allocated_count - request.change_amount).max(0),
        };

        if new_allocated < allocation.used_count {
            return Err(AppError::conflict(format!(
                "Allocation cannot drop below {} seats currently in use",
                allocation.used_count
            )));
        }

        sqlx::query(
            "UPDATE license_allocations SET allocated_count = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(allocation.id)
        .bind(new_allocated)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to update allocation", e))?;

        sqlx::query(
            "UPDATE license_update_requests SET status = 'approved', updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to approve request", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::db_err("Failed to commit decide transaction", e))?;

        Ok(DecisionApplied::Finalized {
            new_allocated_count: new_allocated,
        })
    }

    async fn cancel_request(&self, request_id: Uuid) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_err("Failed to begin cancel transaction", e))?;

        let request = Self::lock_request(&mut tx, request_id)
            .await?
            .ok_or_else(|| AppError::not_found("Request not found"))?;

        if request.status.is_terminal() {
            return Err(AppError::invalid_state(format!(
                "Cannot cancel a request in status {}",
                request.status
            )));
        }

        sqlx::query(
            "UPDATE license_update_requests SET status = 'cancelled', updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to cancel request", e))?;

        sqlx::query(
            "UPDATE license_update_approvals SET status = 'cancelled' \
             WHERE request_id = $1 AND decision = 'pending'",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to cancel pending steps", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::db_err("Failed to commit cancel transaction", e))?;

        Ok(())
    }

    async fn find_allocation(
        &self,
        tenant_id: Uuid,
        resource_type: ResourceType,
    ) -> AppResult<Option<LicenseAllocation>> {
        sqlx::query_as::<_, LicenseAllocation>(
            "SELECT * FROM license_allocations WHERE tenant_id = $1 AND resource_type = $2",
        )
        .bind(tenant_id)
        .bind(resource_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to find allocation", e))
    }
}
