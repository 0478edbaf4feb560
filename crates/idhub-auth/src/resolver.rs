//! Credential resolution across the three actor kinds.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use idhub_core::config::auth::AuthConfig;
use idhub_core::error::AppError;
use idhub_core::result::AppResult;
use idhub_entity::actor::{ActorKind, ActorStatus, CredentialRecord, CredentialSource};
use idhub_entity::login_attempt::{LoginAttemptSink, NewLoginAttempt};

use crate::password::PasswordHasher;

const LOCKOUT_MESSAGE: &str = "Your account has been blocked due to too many failed login \
attempts. Please contact your administrator.";

/// A successfully authenticated identity, normalized across actor kinds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthSubject {
    /// Actor identifier.
    pub actor_id: Uuid,
    /// Login email as stored.
    pub email: String,
    /// Which kind of actor matched.
    pub kind: ActorKind,
    /// Owning tenant (None for platform actors).
    pub tenant_id: Option<Uuid>,
    /// Resolved role (primary role for department users).
    pub role_id: Option<Uuid>,
    /// Display name, when the kind carries one.
    pub display_name: Option<String>,
}

/// Resolves an (email, password) pair to an authenticated subject.
///
/// Credential sources are probed in fixed priority order — super-admins,
/// then tenant users, then department users — stopping at the first email
/// match. Exactly one login attempt row is recorded per verification.
#[derive(Debug, Clone)]
pub struct AuthResolver {
    /// Lookup strategies in probe order.
    sources: Vec<Arc<dyn CredentialSource>>,
    /// Append-only attempt log.
    attempts: Arc<dyn LoginAttemptSink>,
    /// Password verification.
    hasher: PasswordHasher,
    /// Lockout threshold.
    max_failed_attempts: i32,
}

impl AuthResolver {
    /// Creates a resolver over the given sources, which must already be
    /// in probe priority order.
    pub fn new(
        sources: Vec<Arc<dyn CredentialSource>>,
        attempts: Arc<dyn LoginAttemptSink>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            sources,
            attempts,
            hasher: PasswordHasher::new(),
            max_failed_attempts: config.max_failed_attempts,
        }
    }

    /// Resolve credentials to a subject.
    ///
    /// Returns `Ok(None)` for any failure the caller should surface as
    /// generic invalid credentials. Permanent lockout is a distinct error
    /// so callers can show an actionable message.
    pub async fn resolve(
        &self,
        email: &str,
        password: &str,
        ip_addr: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<Option<AuthSubject>> {
        if email.trim().is_empty() || password.is_empty() {
            return Ok(None);
        }
        let email = email.trim().to_lowercase();

        for source in &self.sources {
            let Some(record) = source.find_by_email(&email).await? else {
                continue;
            };

            return self
                .authenticate(source.as_ref(), record, &email, password, ip_addr, user_agent)
                .await;
        }

        Ok(None)
    }

    async fn authenticate(
        &self,
        source: &dyn CredentialSource,
        record: CredentialRecord,
        email: &str,
        password: &str,
        ip_addr: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<Option<AuthSubject>> {
        match record.status {
            ActorStatus::Deactivated => {
                self.log_attempt(&record, email, ip_addr, user_agent, false, Some("account_deactivated"))
                    .await;
                return Err(AppError::account_locked(LOCKOUT_MESSAGE));
            }
            ActorStatus::Suspended => {
                // Suspension is reversible; surface it as generic invalid
                // credentials rather than the permanent-lockout error.
                self.log_attempt(&record, email, ip_addr, user_agent, false, Some("account_suspended"))
                    .await;
                return Ok(None);
            }
            ActorStatus::Active => {}
        }

        let valid = self
            .hasher
            .verify_password(password, &record.password_hash)?;

        self.log_attempt(
            &record,
            email,
            ip_addr,
            user_agent,
            valid,
            if valid { None } else { Some("wrong_password") },
        )
        .await;

        if valid {
            source.reset_lockout(record.id).await?;
            return Ok(Some(AuthSubject {
                actor_id: record.id,
                email: record.email,
                kind: record.kind,
                tenant_id: record.tenant_id,
                role_id: record.role_id,
                display_name: record.display_name,
            }));
        }

        let attempts = source.record_failure(record.id).await?;
        if attempts >= self.max_failed_attempts {
            source.lock(record.id).await?;
            warn!(
                actor_id = %record.id,
                kind = %record.kind,
                attempts,
                "Account deactivated after repeated login failures"
            );
            return Err(AppError::account_locked(LOCKOUT_MESSAGE));
        }

        Ok(None)
    }

    /// Attempt logging must never fail authentication; storage errors are
    /// logged and swallowed.
    async fn log_attempt(
        &self,
        record: &CredentialRecord,
        email: &str,
        ip_addr: Option<&str>,
        user_agent: Option<&str>,
        success: bool,
        reason: Option<&str>,
    ) {
        let attempt = NewLoginAttempt {
            actor_id: Some(record.id),
            actor_kind: Some(record.kind),
            email: Some(email.to_string()),
            ip_addr: ip_addr.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            success,
            reason: reason.map(str::to_string),
        };

        if let Err(e) = self.attempts.record(attempt).await {
            warn!(error = %e, "Failed to record login attempt");
        }
    }
}
