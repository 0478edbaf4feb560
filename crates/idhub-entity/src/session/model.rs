//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::actor::ActorKind;

/// One issued refresh credential.
///
/// The session id doubles as the token identifier embedded in access
/// tokens. Only a one-way hash of the raw secret is stored; the raw value
/// exists outside the client exactly once, at issue time. Rows are never
/// physically deleted — revocation chains stay reconstructable through
/// `replaced_by`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session/token identifier.
    pub id: Uuid,
    /// The actor this session belongs to.
    pub actor_id: Uuid,
    /// Which kind of actor owns the session.
    pub actor_kind: ActorKind,
    /// Owning tenant (None for platform actors).
    pub tenant_id: Option<Uuid>,
    /// Owner email at issue time.
    pub email: String,
    /// SHA-256 hash of the raw refresh secret.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Whether the session has been revoked.
    pub revoked: bool,
    /// The session that replaced this one on rotation.
    pub replaced_by: Option<Uuid>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the session is still usable (not revoked, not expired).
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}

/// Data required to create a new session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// The actor this session belongs to.
    pub actor_id: Uuid,
    /// Which kind of actor owns the session.
    pub actor_kind: ActorKind,
    /// Owning tenant (None for platform actors).
    pub tenant_id: Option<Uuid>,
    /// Owner email.
    pub email: String,
    /// SHA-256 hash of the raw refresh secret.
    pub token_hash: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(revoked: bool, expires_in: Duration) -> Session {
        Session {
            id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            actor_kind: ActorKind::TenantUser,
            tenant_id: Some(Uuid::new_v4()),
            email: "user@example.com".into(),
            token_hash: "hash".into(),
            revoked,
            replaced_by: None,
            created_at: Utc::now(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn test_active_session() {
        assert!(session(false, Duration::days(1)).is_active());
    }

    #[test]
    fn test_revoked_is_not_active() {
        assert!(!session(true, Duration::days(1)).is_active());
    }

    #[test]
    fn test_expired_is_not_active() {
        let s = session(false, Duration::seconds(-5));
        assert!(s.is_expired());
        assert!(!s.is_active());
    }
}
