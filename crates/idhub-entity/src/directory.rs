//! Tenant/role/user directory seam.

use async_trait::async_trait;
use uuid::Uuid;

use idhub_core::result::AppResult;

use crate::license::level::ApprovalLevel;

/// Read access to the tenant/role/user directory.
///
/// The MFA policy resolver and the license approval engine consult this
/// seam; the backing tables are owned by CRUD flows outside this
/// workspace.
#[async_trait]
pub trait DirectoryProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The tenant's global MFA switch. `None` when the tenant does not exist.
    async fn tenant_mfa_enabled(&self, tenant_id: Uuid) -> AppResult<Option<bool>>;

    /// The user-level MFA override, when a row exists.
    async fn mfa_override(&self, user_id: Uuid) -> AppResult<Option<bool>>;

    /// The role-level MFA policy for a (tenant, role) pair, when a row exists.
    async fn role_mfa_policy(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<Option<bool>>;

    /// Whether the actor belongs to the organizational unit named by an
    /// approval stage label.
    async fn is_member_of_stage(&self, actor_id: Uuid, stage: &str) -> AppResult<bool>;

    /// The tenant's configured approval chain, ordered by step.
    async fn approval_levels(&self, tenant_id: Uuid) -> AppResult<Vec<ApprovalLevel>>;
}
