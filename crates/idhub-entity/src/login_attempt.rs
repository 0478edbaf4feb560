//! Login attempt audit entities and sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use idhub_core::result::AppResult;

use crate::actor::ActorKind;

/// Immutable record of one authentication attempt.
///
/// Written on every attempt, never mutated or deleted. Lockout counting
/// is tracked on the actor row, not recomputed from this log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// The matched actor, when one matched.
    pub actor_id: Option<Uuid>,
    /// Which kind of actor matched.
    pub actor_kind: Option<ActorKind>,
    /// Email as presented (lowercased).
    pub email: Option<String>,
    /// Client IP address.
    pub ip_addr: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Failure reason (`wrong_password`, `account_deactivated`, ...).
    pub reason: Option<String>,
    /// When the attempt happened.
    pub created_at: DateTime<Utc>,
}

/// Data recorded for a new login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoginAttempt {
    /// The matched actor, when one matched.
    pub actor_id: Option<Uuid>,
    /// Which kind of actor matched.
    pub actor_kind: Option<ActorKind>,
    /// Email as presented (lowercased).
    pub email: Option<String>,
    /// Client IP address.
    pub ip_addr: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Failure reason.
    pub reason: Option<String>,
}

/// Append-only sink for login attempts.
#[async_trait]
pub trait LoginAttemptSink: Send + Sync + std::fmt::Debug + 'static {
    /// Persist one attempt row.
    async fn record(&self, attempt: NewLoginAttempt) -> AppResult<()>;
}
