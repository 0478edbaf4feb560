//! Department-user credential repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::actor::{
    ActorKind, CredentialRecord, CredentialSource, DepartmentRoleMapping, DepartmentUser,
};

/// Repository for department-user credentials.
#[derive(Debug, Clone)]
pub struct DepartmentUserRepository {
    pool: PgPool,
}

impl DepartmentUserRepository {
    /// Create a new department-user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a department user by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DepartmentUser>> {
        sqlx::query_as::<_, DepartmentUser>("SELECT * FROM department_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find department user", e)
            })
    }

    /// Resolve the user's primary role from the role-mapping set: the
    /// mapping flagged `primary_role` wins; none flagged leaves it empty.
    async fn primary_role(&self, department_user_id: Uuid) -> AppResult<Option<Uuid>> {
        let mappings = sqlx::query_as::<_, DepartmentRoleMapping>(
            "SELECT * FROM department_user_roles WHERE department_user_id = $1",
        )
        .bind(department_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load role mappings", e))?;

        Ok(mappings
            .iter()
            .find(|m| m.primary_role)
            .map(|m| m.role_id))
    }

    /// Resolve the tenant the user's department belongs to.
    async fn tenant_of_department(&self, department_id: Uuid) -> AppResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT tenant_id FROM departments WHERE id = $1")
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find department tenant", e)
            })
    }
}

#[async_trait]
impl CredentialSource for DepartmentUserRepository {
    fn kind(&self) -> ActorKind {
        ActorKind::DepartmentUser
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<CredentialRecord>> {
        let row = sqlx::query_as::<_, DepartmentUser>(
            "SELECT * FROM department_users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find department user by email",
                e,
            )
        })?;

        let Some(user) = row else {
            return Ok(None);
        };

        // No mapping flagged primary leaves role_id empty; the caller's
        // authorization for that subject is then identity-only.
        let role_id = self.primary_role(user.id).await?;
        let tenant_id = self.tenant_of_department(user.department_id).await?;

        Ok(Some(CredentialRecord::from_credential(
            &user,
            ActorKind::DepartmentUser,
            tenant_id,
            role_id,
            user.full_name.clone(),
        )))
    }

    async fn record_failure(&self, id: Uuid) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE department_users SET failed_login_attempts = failed_login_attempts + 1, \
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
            "UPDATE department_users SET status = 'deactivated', locked_at = NOW(), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to lock department user", e)
        })?;
        Ok(())
    }

    async fn reset_lockout(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE department_users SET failed_login_attempts = 0, locked_at = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset lockout", e))?;
        Ok(())
    }
}
