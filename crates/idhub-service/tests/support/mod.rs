//! In-memory fakes shared by the service integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use idhub_core::error::AppError;
use idhub_core::result::AppResult;
use idhub_core::traits::notifier::Notifier;
use idhub_entity::actor::{ActorKind, ActorStatus, CredentialRecord, CredentialSource};
use idhub_entity::audit::{AuditEvent, AuditSink};
use idhub_entity::directory::DirectoryProvider;
use idhub_entity::license::level::ApprovalLevel;
use idhub_entity::license::{
    ApprovalStore, ChangeDirection, DecisionApplied, LicenseAllocation, LicenseUpdateApproval,
    LicenseUpdateRequest, NewLicenseRequest, RequestStatus, ResourceType, StepDecision,
};
use idhub_entity::login_attempt::{LoginAttemptSink, NewLoginAttempt};
use idhub_entity::session::{NewSession, Session, SessionStore};

#[derive(Debug, Default)]
struct WorkflowState {
    requests: HashMap<Uuid, LicenseUpdateRequest>,
    approvals: Vec<LicenseUpdateApproval>,
    allocations: Vec<LicenseAllocation>,
}

/// Approval store with the same guard semantics as the Postgres one,
/// linearized by a mutex.
#[derive(Debug, Default)]
pub struct MemoryApprovalStore {
    state: Mutex<WorkflowState>,
}

impl MemoryApprovalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocation(
        self,
        tenant_id: Uuid,
        resource_type: ResourceType,
        allocated: i32,
        used: i32,
    ) -> Self {
        self.state.lock().unwrap().allocations.push(LicenseAllocation {
            id: Uuid::new_v4(),
            tenant_id,
            resource_type,
            allocated_count: allocated,
            used_count: used,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        self
    }
}

#[async_trait]
impl ApprovalStore for MemoryApprovalStore {
    async fn create_request(
        &self,
        data: NewLicenseRequest,
        stages: Vec<String>,
    ) -> AppResult<LicenseUpdateRequest> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let request = LicenseUpdateRequest {
            id: Uuid::new_v4(),
            tenant_id: data.tenant_id,
            tenant_name: data.tenant_name.clone(),
            resource_type: data.resource_type,
            direction: data.direction,
            current_count: data.current_count,
            change_amount: data.change_amount,
            new_total: data.new_total(),
            reason: data.reason.clone(),
            requested_by: data.requested_by,
            status: RequestStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        for (i, stage) in stages.iter().enumerate() {
            state.approvals.push(LicenseUpdateApproval {
                id: Uuid::new_v4(),
                request_id: request.id,
                stage: stage.clone(),
                decision: StepDecision::Pending,
                decided_by: None,
                comments: None,
                decided_at: None,
                status: RequestStatus::Pending,
                // Distinct timestamps keep the earliest-pending order.
                created_at: now + Duration::milliseconds(i as i64),
            });
        }

        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: Uuid) -> AppResult<Option<LicenseUpdateRequest>> {
        Ok(self.state.lock().unwrap().requests.get(&id).cloned())
    }

    async fn approvals_for(&self, request_id: Uuid) -> AppResult<Vec<LicenseUpdateApproval>> {
        let state = self.state.lock().unwrap();
        let mut approvals: Vec<_> = state
            .approvals
            .iter()
            .filter(|a| a.request_id == request_id)
            .cloned()
            .collect();
        approvals.sort_by_key(|a| a.created_at);
        Ok(approvals)
    }

    async fn current_pending_step(
        &self,
        request_id: Uuid,
    ) -> AppResult<Option<LicenseUpdateApproval>> {
        Ok(self
            .approvals_for(request_id)
            .await?
            .into_iter()
            .find(|a| a.is_pending()))
    }

    async fn record_decision(
        &self,
        request_id: Uuid,
        approval_id: Uuid,
        decided_by: Uuid,
        decision: StepDecision,
        comments: Option<String>,
    ) -> AppResult<DecisionApplied> {
        let mut state = self.state.lock().unwrap();

        let request = state
            .requests
            .get(&request_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Request not found"))?;
        if request.status.is_terminal() {
            return Err(AppError::already_decided(format!(
                "Request already {}",
                request.status
            )));
        }

        let mut pending: Vec<_> = state
            .approvals
            .iter()
            .filter(|a| a.request_id == request_id && a.is_pending())
            .map(|a| (a.created_at, a.id))
            .collect();
        pending.sort();

        let Some(&(_, earliest_id)) = pending.first() else {
            return Err(AppError::invalid_state("No pending approval step"));
        };
        if earliest_id != approval_id {
            return Err(AppError::conflict(
                "The current approval step changed; reload and retry",
            ));
        }

        let is_final = decision == StepDecision::Approved && pending.len() == 1;

        // Validate the allocation before mutating anything, mirroring the
        // transactional rollback of the real store.
        let mut final_allocation: Option<(usize, i32)> = None;
        if is_final {
            let idx = state
                .allocations
                .iter()
                .position(|a| {
                    a.tenant_id == request.tenant_id && a.resource_type == request.resource_type
                })
                .ok_or_else(|| {
                    AppError::invalid_state(
                        "No allocation exists for this tenant and resource; decision not applied",
                    )
                })?;

            let allocation = &state.allocations[idx];
            let new_allocated = match request.direction {
                ChangeDirection::Increase => allocation.allocated_count + request.change_amount,
                ChangeDirection::Decrease => {
                    (allocation.allocated_count - request.change_amount).max(0)
                }
            };
            if new_allocated < allocation.used_count {
                return Err(AppError::conflict(format!(
                    "Allocation cannot drop below {} seats currently in use",
                    allocation.used_count
                )));
            }
            final_allocation = Some((idx, new_allocated));
        }

        let step = state
            .approvals
            .iter_mut()
            .find(|a| a.id == approval_id)
            .expect("step disappeared");
        step.decision = decision;
        step.decided_by = Some(decided_by);
        step.comments = comments.clone();
        step.decided_at = Some(Utc::now());
        step.status = match decision {
            StepDecision::Approved => RequestStatus::Approved,
            StepDecision::Rejected => RequestStatus::Rejected,
            StepDecision::Pending => RequestStatus::Pending,
        };

        if decision == StepDecision::Rejected {
            let request = state.requests.get_mut(&request_id).unwrap();
            request.status = RequestStatus::Rejected;
            request.rejection_reason =
                Some(comments.unwrap_or_else(|| "Rejected by approver".to_string()));
            request.updated_at = Utc::now();
            return Ok(DecisionApplied::Rejected);
        }

        if let Some((idx, new_allocated)) = final_allocation {
            state.allocations[idx].allocated_count = new_allocated;
            state.allocations[idx].updated_at = Utc::now();
            let request = state.requests.get_mut(&request_id).unwrap();
            request.status = RequestStatus::Approved;
            request.updated_at = Utc::now();
            return Ok(DecisionApplied::Finalized {
                new_allocated_count: new_allocated,
            });
        }

        let next_stage = state
            .approvals
            .iter()
            .filter(|a| a.request_id == request_id && a.is_pending())
            .min_by_key(|a| a.created_at)
            .map(|a| a.stage.clone())
            .expect("a pending step must remain");
        Ok(DecisionApplied::Advanced { next_stage })
    }

    async fn cancel_request(&self, request_id: Uuid) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        let request = state
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| AppError::not_found("Request not found"))?;
        if request.status.is_terminal() {
            return Err(AppError::invalid_state(format!(
                "Cannot cancel a request in status {}",
                request.status
            )));
        }
        request.status = RequestStatus::Cancelled;
        request.updated_at = Utc::now();

        for step in state
            .approvals
            .iter_mut()
            .filter(|a| a.request_id == request_id && a.decision == StepDecision::Pending)
        {
            step.status = RequestStatus::Cancelled;
        }
        Ok(())
    }

    async fn find_allocation(
        &self,
        tenant_id: Uuid,
        resource_type: ResourceType,
    ) -> AppResult<Option<LicenseAllocation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .allocations
            .iter()
            .find(|a| a.tenant_id == tenant_id && a.resource_type == resource_type)
            .cloned())
    }
}

/// Directory fake with explicit rows.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    pub tenants: Mutex<HashMap<Uuid, bool>>,
    pub overrides: Mutex<HashMap<Uuid, bool>>,
    pub role_policies: Mutex<HashMap<(Uuid, Uuid), bool>>,
    pub memberships: Mutex<Vec<(Uuid, String)>>,
    pub levels: Mutex<HashMap<Uuid, Vec<ApprovalLevel>>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(self, tenant_id: Uuid, mfa_enabled: bool) -> Self {
        self.tenants.lock().unwrap().insert(tenant_id, mfa_enabled);
        self
    }

    pub fn with_role_policy(self, tenant_id: Uuid, role_id: Uuid, required: bool) -> Self {
        self.role_policies
            .lock()
            .unwrap()
            .insert((tenant_id, role_id), required);
        self
    }

    pub fn with_member(self, actor_id: Uuid, stage: &str) -> Self {
        self.memberships
            .lock()
            .unwrap()
            .push((actor_id, stage.to_lowercase()));
        self
    }

    pub fn with_levels(self, tenant_id: Uuid, stages: &[&str]) -> Self {
        let levels = stages
            .iter()
            .enumerate()
            .map(|(i, stage)| ApprovalLevel {
                id: Uuid::new_v4(),
                tenant_id,
                step_order: i as i32 + 1,
                department_name: stage.to_string(),
                stage: Some(stage.to_string()),
                created_at: Utc::now(),
            })
            .collect();
        self.levels.lock().unwrap().insert(tenant_id, levels);
        self
    }
}

#[async_trait]
impl DirectoryProvider for MemoryDirectory {
    async fn tenant_mfa_enabled(&self, tenant_id: Uuid) -> AppResult<Option<bool>> {
        Ok(self.tenants.lock().unwrap().get(&tenant_id).copied())
    }

    async fn mfa_override(&self, user_id: Uuid) -> AppResult<Option<bool>> {
        Ok(self.overrides.lock().unwrap().get(&user_id).copied())
    }

    async fn role_mfa_policy(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<Option<bool>> {
        Ok(self
            .role_policies
            .lock()
            .unwrap()
            .get(&(tenant_id, role_id))
            .copied())
    }

    async fn is_member_of_stage(&self, actor_id: Uuid, stage: &str) -> AppResult<bool> {
        let stage = stage.to_lowercase();
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .any(|(id, s)| *id == actor_id && *s == stage))
    }

    async fn approval_levels(&self, tenant_id: Uuid) -> AppResult<Vec<ApprovalLevel>> {
        Ok(self
            .levels
            .lock()
            .unwrap()
            .get(&tenant_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Audit sink that captures events.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    pub events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn actions(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Session store mirroring the Postgres atomic semantics.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn issue(&self, data: NewSession) -> AppResult<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        for s in sessions.iter_mut() {
            if s.actor_id == data.actor_id {
                s.revoked = true;
            }
        }
        let session = Session {
            id: Uuid::new_v4(),
            actor_id: data.actor_id,
            actor_kind: data.actor_kind,
            tenant_id: data.tenant_id,
            email: data.email,
            token_hash: data.token_hash,
            revoked: false,
            replaced_by: None,
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn rotate(&self, old_id: Uuid, data: NewSession) -> AppResult<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        let old = sessions
            .iter_mut()
            .find(|s| s.id == old_id)
            .ok_or_else(|| AppError::invalid_session("Session not found"))?;
        if old.revoked {
            return Err(AppError::revoked_session("Refresh token has been revoked"));
        }
        old.revoked = true;
        let new_id = Uuid::new_v4();
        old.replaced_by = Some(new_id);

        let session = Session {
            id: new_id,
            actor_id: data.actor_id,
            actor_kind: data.actor_kind,
            tenant_id: data.tenant_id,
            email: data.email,
            token_hash: data.token_hash,
            revoked: false,
            replaced_by: None,
            created_at: Utc::now(),
            expires_at: data.expires_at,
        };
        sessions.push(session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.iter_mut().find(|s| s.id == id && !s.revoked) {
            Some(s) => {
                s.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_actor(&self, actor_id: Uuid, keep: Option<Uuid>) -> AppResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut revoked = 0;
        for s in sessions.iter_mut() {
            if s.actor_id == actor_id && !s.revoked && keep != Some(s.id) {
                s.revoked = true;
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn count_active_for_actor(&self, actor_id: Uuid) -> AppResult<i64> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.actor_id == actor_id && s.is_active())
            .count() as i64)
    }
}

/// Credential source backed by a mutex-guarded map.
#[derive(Debug)]
pub struct MemoryCredentialSource {
    kind: ActorKind,
    records: Mutex<HashMap<Uuid, CredentialRecord>>,
}

impl MemoryCredentialSource {
    pub fn new(kind: ActorKind) -> Self {
        Self {
            kind,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, record: CredentialRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }
}

#[async_trait]
impl CredentialSource for MemoryCredentialSource {
    fn kind(&self) -> ActorKind {
        self.kind
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn record_failure(&self, id: Uuid) -> AppResult<i32> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).expect("unknown actor");
        record.failed_login_attempts += 1;
        Ok(record.failed_login_attempts)
    }

    async fn lock(&self, id: Uuid) -> AppResult<()> {
        let mut records = self.records.lock().unwrap();
        records.get_mut(&id).expect("unknown actor").status = ActorStatus::Deactivated;
        Ok(())
    }

    async fn reset_lockout(&self, id: Uuid) -> AppResult<()> {
        let mut records = self.records.lock().unwrap();
        records
            .get_mut(&id)
            .expect("unknown actor")
            .failed_login_attempts = 0;
        Ok(())
    }
}

/// Attempt sink that swallows rows.
#[derive(Debug, Default)]
pub struct MemoryAttemptSink;

#[async_trait]
impl LoginAttemptSink for MemoryAttemptSink {
    async fn record(&self, _attempt: NewLoginAttempt) -> AppResult<()> {
        Ok(())
    }
}

/// Notifier that captures outgoing messages.
#[derive(Debug, Default)]
pub struct CapturingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    pub fn last_body(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl Notifier for CapturingNotifier {
    async fn send(&self, recipient: &str, _subject: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), body.to_string()));
        Ok(())
    }
}
