//! Audit event entity and sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use idhub_core::result::AppResult;

use crate::actor::ActorKind;

/// A structured audit event, appended fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The acting identity, when known.
    pub actor_id: Option<Uuid>,
    /// Which kind of actor acted.
    pub actor_kind: Option<ActorKind>,
    /// Tenant scope of the action.
    pub tenant_id: Option<Uuid>,
    /// The action performed (e.g. `"auth.login"`, `"license.request_approved"`).
    pub action: String,
    /// The resource acted on.
    pub resource: Option<String>,
    /// Additional structured details.
    pub metadata: Option<serde_json::Value>,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Create an event for the given action, stamped now.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            actor_kind: None,
            tenant_id: None,
            action: action.into(),
            resource: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the acting identity.
    pub fn actor(mut self, actor_id: Uuid, kind: ActorKind) -> Self {
        self.actor_id = Some(actor_id);
        self.actor_kind = Some(kind);
        self
    }

    /// Attach the tenant scope.
    pub fn tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Attach the resource name.
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Attach structured details.
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Append-only sink for audit events. Failures are logged by callers and
/// never block the primary operation.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Persist one audit event.
    async fn append(&self, event: AuditEvent) -> AppResult<()>;
}
