//! Tenant/role/user directory implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::directory::DirectoryProvider;
use idhub_entity::license::level::ApprovalLevel;
use idhub_entity::mfa::{MfaOverride, RoleMfaPolicy};
use idhub_entity::tenant::Tenant;

/// PostgreSQL-backed directory reads.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Create a new directory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tenant by id.
    pub async fn find_tenant(&self, tenant_id: Uuid) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant", e))
    }
}

#[async_trait]
impl DirectoryProvider for PgDirectory {
    async fn tenant_mfa_enabled(&self, tenant_id: Uuid) -> AppResult<Option<bool>> {
        Ok(self
            .find_tenant(tenant_id)
            .await?
            .map(|tenant| tenant.mfa_enabled))
    }

    async fn mfa_override(&self, user_id: Uuid) -> AppResult<Option<bool>> {
        let row = sqlx::query_as::<_, MfaOverride>(
            "SELECT * FROM mfa_overrides WHERE user_id = $1 AND method = 'email' LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read MFA override", e))?;

        Ok(row.map(|o| o.enabled))
    }

    async fn role_mfa_policy(&self, tenant_id: Uuid, role_id: Uuid) -> AppResult<Option<bool>> {
        let row = sqlx::query_as::<_, RoleMfaPolicy>(
            "SELECT * FROM role_mfa_policies WHERE tenant_id = $1 AND role_id = $2",
        )
        .bind(tenant_id)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read role MFA policy", e)
        })?;

        Ok(row.map(|p| p.mfa_required))
    }

    async fn is_member_of_stage(&self, actor_id: Uuid, stage: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
               SELECT 1 FROM department_users du \
               JOIN department_roles dr ON dr.department_id = du.department_id \
               WHERE du.id = $1 AND LOWER(dr.name) = LOWER($2) \
             )",
        )
        .bind(actor_id)
        .bind(stage)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check stage membership", e)
        })
    }

    async fn approval_levels(&self, tenant_id: Uuid) -> AppResult<Vec<ApprovalLevel>> {
        sqlx::query_as::<_, ApprovalLevel>(
            "SELECT * FROM approval_levels WHERE tenant_id = $1 ORDER BY step_order ASC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list approval levels", e)
        })
    }
}
