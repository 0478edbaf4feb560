//! Login attempt repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::login_attempt::{LoginAttempt, LoginAttemptSink, NewLoginAttempt};

/// Append-only repository for login attempt rows.
#[derive(Debug, Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent attempts for an email, for admin review screens.
    pub async fn recent_for_email(&self, email: &str, limit: i64) -> AppResult<Vec<LoginAttempt>> {
        sqlx::query_as::<_, LoginAttempt>(
            "SELECT * FROM login_attempts WHERE email = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(email)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list login attempts", e)
        })
    }
}

#[async_trait]
impl LoginAttemptSink for LoginAttemptRepository {
    async fn record(&self, attempt: NewLoginAttempt) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO login_attempts \
             (actor_id, actor_kind, email, ip_addr, user_agent, success, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(attempt.actor_id)
        .bind(attempt.actor_kind)
        .bind(&attempt.email)
        .bind(&attempt.ip_addr)
        .bind(&attempt.user_agent)
        .bind(attempt.success)
        .bind(&attempt.reason)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record login attempt", e)
        })?;
        Ok(())
    }
}
