//! Login, refresh, and logout orchestration.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use idhub_auth::mfa::{MfaChallenger, MfaPolicyResolver};
use idhub_auth::resolver::{AuthResolver, AuthSubject};
use idhub_auth::session::SessionManager;
use idhub_auth::token::{AccessTokenIssuer, IssuedAccessToken};
use idhub_core::error::AppError;
use idhub_core::result::AppResult;
use idhub_entity::actor::ActorKind;
use idhub_entity::audit::AuditEvent;
use idhub_entity::session::Session;

use crate::audit::AuditHandle;

/// A completed login: the session, its raw refresh secret, and a signed
/// access token bound to the session id.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// The authenticated identity.
    pub subject: AuthSubject,
    /// The issued session row.
    pub session: Session,
    /// Raw refresh secret, delivered to the client exactly once.
    pub refresh_token: String,
    /// Signed access token embedding the session id.
    pub access_token: IssuedAccessToken,
}

/// What a login call resolved to.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Credentials are valid but a second factor is required; a
    /// challenge code has been dispatched out of band.
    MfaRequired {
        /// The actor awaiting challenge completion.
        actor_id: Uuid,
        /// Which kind of actor it is.
        kind: ActorKind,
    },
    /// Login completed; tokens issued.
    LoggedIn(Box<LoginSuccess>),
}

/// Orchestrates the login control flow: credential resolution, MFA
/// policy, challenge dispatch, session issue, and access-token signing.
#[derive(Debug, Clone)]
pub struct AuthService {
    resolver: AuthResolver,
    mfa_policy: MfaPolicyResolver,
    challenger: MfaChallenger,
    sessions: SessionManager,
    tokens: Arc<dyn AccessTokenIssuer>,
    audit: AuditHandle,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        resolver: AuthResolver,
        mfa_policy: MfaPolicyResolver,
        challenger: MfaChallenger,
        sessions: SessionManager,
        tokens: Arc<dyn AccessTokenIssuer>,
        audit: AuditHandle,
    ) -> Self {
        Self {
            resolver,
            mfa_policy,
            challenger,
            sessions,
            tokens,
            audit,
        }
    }

    /// Authenticate credentials and either issue tokens or dispatch an
    /// MFA challenge.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        ip_addr: Option<&str>,
        user_agent: Option<&str>,
    ) -> AppResult<LoginOutcome> {
        let subject = self
            .resolver
            .resolve(email, password, ip_addr, user_agent)
            .await?
            .ok_or_else(|| AppError::invalid_credentials("Invalid email or password"))?;

        let mfa_required = self
            .mfa_policy
            .is_required(subject.tenant_id, Some(subject.actor_id), subject.role_id)
            .await?;

        if mfa_required {
            self.challenger.issue(subject.actor_id, &subject.email).await?;
            let mut event = AuditEvent::new("auth.mfa_challenged")
                .actor(subject.actor_id, subject.kind)
                .resource("mfa_challenge");
            if let Some(tenant_id) = subject.tenant_id {
                event = event.tenant(tenant_id);
            }
            self.audit.dispatch(event);
            info!(actor_id = %subject.actor_id, "MFA challenge dispatched");
            return Ok(LoginOutcome::MfaRequired {
                actor_id: subject.actor_id,
                kind: subject.kind,
            });
        }

        let success = self.complete_login(&subject).await?;
        Ok(LoginOutcome::LoggedIn(Box::new(success)))
    }

    /// Check a submitted challenge code.
    pub async fn verify_challenge(&self, actor_id: Uuid, code: &str) -> AppResult<bool> {
        self.challenger.verify(actor_id, code).await
    }

    /// Issue a session and access token for an authenticated subject —
    /// the tail of the login flow, also called after a successful
    /// challenge verification.
    pub async fn complete_login(&self, subject: &AuthSubject) -> AppResult<LoginSuccess> {
        let (refresh_token, session) = self
            .sessions
            .issue(
                subject.actor_id,
                subject.kind,
                subject.tenant_id,
                &subject.email,
            )
            .await?;

        let access_token = self.tokens.issue(subject, session.id)?;

        self.audit.dispatch(
            AuditEvent::new("auth.login")
                .actor(subject.actor_id, subject.kind)
                .resource("session")
                .metadata(json!({ "session_id": session.id })),
        );

        Ok(LoginSuccess {
            subject: subject.clone(),
            session,
            refresh_token,
            access_token,
        })
    }

    /// Rotate a refresh secret and sign a new access token for it.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<LoginSuccess> {
        let (new_refresh, session) = self.sessions.rotate(refresh_token).await?;

        // Rotation carries identity forward from the session row; role
        // resolution belongs to per-request authorization, not here.
        let subject = AuthSubject {
            actor_id: session.actor_id,
            email: session.email.clone(),
            kind: session.actor_kind,
            tenant_id: session.tenant_id,
            role_id: None,
            display_name: None,
        };

        let access_token = self.tokens.issue(&subject, session.id)?;

        self.audit.dispatch(
            AuditEvent::new("auth.token_refreshed")
                .actor(session.actor_id, session.actor_kind)
                .resource("session")
                .metadata(json!({ "session_id": session.id })),
        );

        Ok(LoginSuccess {
            subject,
            session,
            refresh_token: new_refresh,
            access_token,
        })
    }

    /// Revoke the session behind a refresh secret.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.sessions.revoke_by_secret(refresh_token).await?;
        self.audit
            .dispatch(AuditEvent::new("auth.logout").resource("session"));
        Ok(())
    }

    /// The session manager, for request-validation middleware.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
