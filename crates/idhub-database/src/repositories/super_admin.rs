//! Super-admin credential repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::actor::{ActorKind, CredentialRecord, CredentialSource, SuperAdmin};

/// Repository for platform super-admin credentials.
#[derive(Debug, Clone)]
pub struct SuperAdminRepository {
    pool: PgPool,
}

impl SuperAdminRepository {
    /// Create a new super-admin repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a super-admin by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SuperAdmin>> {
        sqlx::query_as::<_, SuperAdmin>("SELECT * FROM super_admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find super admin", e)
            })
    }
}

#[async_trait]
impl CredentialSource for SuperAdminRepository {
    fn kind(&self) -> ActorKind {
        ActorKind::SuperAdmin
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        let row = sqlx::query_as::<_, SuperAdmin>(
            "SELECT * FROM super_admins WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find super admin by email", e)
        })?;

        Ok(row.map(|admin| {
            CredentialRecord::from_credential(
                &admin,
                ActorKind::SuperAdmin,
                None,
                admin.role_id,
                admin.username.clone(),
            )
        }))
    }

    async fn record_failure(&self, id: Uuid) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE super_admins SET failed_login_attempts = failed_login_attempts + 1, \
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
            "UPDATE super_admins SET status = 'deactivated', locked_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock super admin", e))?;
        Ok(())
    }

    async fn reset_lockout(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE super_admins SET failed_login_attempts = 0, locked_at = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset lockout", e))?;
        Ok(())
    }
}
