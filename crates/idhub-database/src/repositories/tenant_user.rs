//! Tenant-user credential repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::actor::{ActorKind, CredentialRecord, CredentialSource, TenantUser};

/// Repository for tenant-scoped user credentials.
#[derive(Debug, Clone)]
pub struct TenantUserRepository {
    pool: PgPool,
}

impl TenantUserRepository {
    /// Create a new tenant-user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a tenant user by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TenantUser>> {
        sqlx::query_as::<_, TenantUser>("SELECT * FROM tenant_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find tenant user", e)
            })
    }
}

#[async_trait]
impl CredentialSource for TenantUserRepository {
    fn kind(&self) -> ActorKind {
        ActorKind::TenantUser
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        let row = sqlx::query_as::<_, TenantUser>(
            "SELECT * FROM tenant_users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find tenant user by email", e)
        })?;

        Ok(row.map(|user| {
            CredentialRecord::from_credential(
                &user,
                ActorKind::TenantUser,
                Some(user.tenant_id),
                user.role_id,
                user.display_name.clone(),
            )
        }))
    }

    async fn record_failure(&self, id: Uuid) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE tenant_users SET failed_login_attempts = failed_login_attempts + 1, \
             updated_at = NOW() WHERE id = $1 RETURNING failed_login_attempts",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record login failure", e)
        })
    }

    async fn lock(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE tenant_users SET status = 'deactivated', locked_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock tenant user", e))?;
        Ok(())
    }

    async fn reset_lockout(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE tenant_users SET failed_login_attempts = 0, locked_at = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset lockout", e))?;
        Ok(())
    }
}
