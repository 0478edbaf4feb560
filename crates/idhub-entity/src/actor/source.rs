//! Credential lookup seam, one source per actor kind.

use async_trait::async_trait;
use uuid::Uuid;

use idhub_core::result::AppResult;

use super::kind::ActorKind;
use super::model::Credential;
use super::status::ActorStatus;

/// A credential match, normalized across actor kinds.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Actor identifier.
    pub id: Uuid,
    /// Login email as stored.
    pub email: String,
    /// Which kind of actor matched.
    pub kind: ActorKind,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Account status.
    pub status: ActorStatus,
    /// Consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Owning tenant (None for platform actors).
    pub tenant_id: Option<Uuid>,
    /// Resolved role (primary role for department users).
    pub role_id: Option<Uuid>,
    /// Display name, when the kind carries one.
    pub display_name: Option<String>,
}

impl CredentialRecord {
    /// Normalize any credential-bearing actor into a record.
    pub fn from_credential<C: Credential>(
        credential: &C,
        kind: ActorKind,
        tenant_id: Option<Uuid>,
        role_id: Option<Uuid>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            id: credential.id(),
            email: credential.email().to_string(),
            kind,
            password_hash: credential.password_hash().to_string(),
            status: credential.status(),
            failed_login_attempts: credential.failed_login_attempts(),
            tenant_id,
            role_id,
            display_name,
        }
    }
}

/// Lookup and lockout mutation for one actor kind.
///
/// The auth resolver holds an ordered list of sources and stops at the
/// first email match, so each source only answers for its own table.
#[async_trait]
pub trait CredentialSource: Send + Sync + std::fmt::Debug + 'static {
    /// The actor kind this source answers for.
    fn kind(&self) -> ActorKind;

    /// Find a credential by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>>;

    /// Record one failed password check. Returns the new attempt count.
    async fn record_failure(&self, id: Uuid) -> AppResult<i32>;

    /// Permanently deactivate the account and stamp the lock time.
    async fn lock(&self, id: Uuid) -> AppResult<()>;

    /// Reset the failed-attempt counter and clear the lock timestamp.
    async fn reset_lockout(&self, id: Uuid) -> AppResult<()>;
}
