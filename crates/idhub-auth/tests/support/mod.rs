//! In-memory fakes shared by the auth integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use idhub_core::result::AppResult;
use idhub_core::traits::notifier::Notifier;
use idhub_entity::actor::{ActorKind, ActorStatus, CredentialRecord, CredentialSource};
use idhub_entity::directory::DirectoryProvider;
use idhub_entity::license::level::ApprovalLevel;
use idhub_entity::login_attempt::{LoginAttemptSink, NewLoginAttempt};
use idhub_entity::session::{NewSession, Session, SessionStore};

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

    pub fn get(&self, id: Uuid) -> Option<CredentialRecord> {
        self.records.lock().unwrap().get(&id).cloned()
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

/// Attempt sink that captures every row.
#[derive(Debug, Default)]
pub struct MemoryAttemptSink {
    pub attempts: Mutex<Vec<NewLoginAttempt>>,
}

impl MemoryAttemptSink {
    pub fn count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn last_reason(&self) -> Option<String> {
        self.attempts
            .lock()
            .unwrap()
            .last()
            .and_then(|a| a.reason.clone())
    }
}

#[async_trait]
impl LoginAttemptSink for MemoryAttemptSink {
    async fn record(&self, attempt: NewLoginAttempt) -> AppResult<()> {
        self.attempts.lock().unwrap().push(attempt);
        Ok(())
    }
}

/// Session store with the same atomic semantics as the Postgres one,
/// linearized by a mutex.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Session> {
        self.sessions.lock().unwrap().clone()
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
            .ok_or_else(|| idhub_core::AppError::invalid_session("Session not found"))?;
        if old.revoked {
            return Err(idhub_core::AppError::revoked_session(
                "Refresh token has been revoked",
            ));
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

    pub fn with_override(self, user_id: Uuid, enabled: bool) -> Self {
        self.overrides.lock().unwrap().insert(user_id, enabled);
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
