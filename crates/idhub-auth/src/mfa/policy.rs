//! MFA requirement resolution.

use std::sync::Arc;

use uuid::Uuid;

use idhub_core::result::AppResult;
use idhub_entity::directory::DirectoryProvider;

/// Decides whether a login must complete a second factor.
///
/// Pure decision precedence over directory reads, first match wins:
///
/// 1. No tenant → not required (platform actors are exempt).
/// 2. Tenant missing or its global `mfa_enabled` is off → not required.
/// 3. A user-level override row exists → its boolean.
/// 4. A role-level policy row exists for (tenant, role) → its boolean.
/// 5. Otherwise → not required. Enabling MFA on the tenant alone does not
///    force it without an explicit role or user rule.
///
/// No side effects; safe to call repeatedly and concurrently.
#[derive(Debug, Clone)]
pub struct MfaPolicyResolver {
    directory: Arc<dyn DirectoryProvider>,
}

impl MfaPolicyResolver {
    /// Creates a resolver over the given directory.
    pub fn new(directory: Arc<dyn DirectoryProvider>) -> Self {
        Self { directory }
    }

    /// Resolve whether a second factor is required.
    pub async fn is_required(
        &self,
        tenant_id: Option<Uuid>,
        user_id: Option<Uuid>,
        role_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let Some(tenant_id) = tenant_id else {
            return Ok(false);
        };

        match self.directory.tenant_mfa_enabled(tenant_id).await? {
            Some(true) => {}
            // Unknown tenant or tenant-level switch off short-circuits
            // every lower-precedence rule.
            Some(false) | None => return Ok(false),
        }

        if let Some(user_id) = user_id {
            if let Some(enabled) = self.directory.mfa_override(user_id).await? {
                return Ok(enabled);
            }
        }

        if let Some(role_id) = role_id {
            if let Some(required) = self.directory.role_mfa_policy(tenant_id, role_id).await? {
                return Ok(required);
            }
        }

        Ok(false)
    }
}
