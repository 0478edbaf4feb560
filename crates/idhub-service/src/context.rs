//! Request context carrying the authenticated actor and session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use idhub_auth::resolver::AuthSubject;
use idhub_entity::actor::ActorKind;

/// Context for the current authenticated request.
///
/// Extracted by middleware and passed into service methods so that every
/// operation knows *who* is acting and from *which* session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated actor's ID.
    pub actor_id: Uuid,
    /// Which kind of actor is acting.
    pub kind: ActorKind,
    /// Tenant scope (None for platform actors).
    pub tenant_id: Option<Uuid>,
    /// Resolved role, when the actor carries one.
    pub role_id: Option<Uuid>,
    /// The current session ID, when the request carries one.
    pub session_id: Option<Uuid>,
    /// IP address of the request origin.
    pub ip_addr: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for an authenticated subject.
    pub fn for_subject(subject: &AuthSubject, session_id: Option<Uuid>) -> Self {
        Self {
            actor_id: subject.actor_id,
            kind: subject.kind,
            tenant_id: subject.tenant_id,
            role_id: subject.role_id,
            session_id,
            ip_addr: None,
            user_agent: None,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current actor carries platform-administrative
    /// privilege.
    pub fn is_admin(&self) -> bool {
        self.kind.is_administrative()
    }
}
