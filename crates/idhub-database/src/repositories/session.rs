//! Session store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::session::{NewSession, Session, SessionStore};

/// PostgreSQL-backed session store.
///
/// The revoke-then-insert pairs run inside one transaction so the
/// single-session invariant and rotation linking are never partially
/// applied. Rows are never deleted; rotation chains stay reconstructable.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn db_err(context: &'static str, e: sqlx::Error) -> AppError {
        AppError::with_source(ErrorKind::Database, context, e)
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn issue(&self, data: NewSession) -> AppResult<Session> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_err("Failed to begin issue transaction", e))?;

        sqlx::query("UPDATE sessions SET revoked = TRUE WHERE actor_id = $1 AND revoked = FALSE")
            .bind(data.actor_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::db_err("Failed to revoke prior sessions", e))?;

        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (actor_id, actor_kind, tenant_id, email, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.actor_id)
        .bind(data.actor_kind)
        .bind(data.tenant_id)
        .bind(&data.email)
        .bind(&data.token_hash)
        .bind(data.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to insert session", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::db_err("Failed to commit issue transaction", e))?;

        Ok(session)
    }

    async fn rotate(&self, old_id: Uuid, data: NewSession) -> AppResult<Session> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::db_err("Failed to begin rotate transaction", e))?;

        // Revoke-if-active doubles as the race check: a concurrent
        // rotation or revocation wins by flipping the flag first.
        let revoked =
            sqlx::query("UPDATE sessions SET revoked = TRUE WHERE id = $1 AND revoked = FALSE")
                .bind(old_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| Self::db_err("Failed to revoke rotated session", e))?;

        if revoked.rows_affected() == 0 {
            return Err(AppError::revoked_session("Refresh token has been revoked"));
        }

        let new_session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (actor_id, actor_kind, tenant_id, email, token_hash, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.actor_id)
        .bind(data.actor_kind)
        .bind(data.tenant_id)
        .bind(&data.email)
        .bind(&data.token_hash)
        .bind(data.expires_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::db_err("Failed to insert replacement session", e))?;

        sqlx::query("UPDATE sessions SET replaced_by = $2 WHERE id = $1")
            .bind(old_id)
            .bind(new_session.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::db_err("Failed to link replacement session", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::db_err("Failed to commit rotate transaction", e))?;

        Ok(new_session)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to find session", e))
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::db_err("Failed to find session by token", e))
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE sessions SET revoked = TRUE WHERE id = $1 AND revoked = FALSE")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| Self::db_err("Failed to revoke session", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_actor(&self, actor_id: Uuid, keep: Option<Uuid>) -> AppResult<u64> {
        let result = match keep {
            Some(keep_id) => sqlx::query(
                "UPDATE sessions SET revoked = TRUE \
                 WHERE actor_id = $1 AND revoked = FALSE AND id != $2",
            )
            .bind(actor_id)
            .bind(keep_id)
            .execute(&self.pool)
            .await,
            None => {
                sqlx::query("UPDATE sessions SET revoked = TRUE WHERE actor_id = $1 AND revoked = FALSE")
                    .bind(actor_id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| Self::db_err("Failed to revoke actor sessions", e))?;

        Ok(result.rows_affected())
    }

    async fn count_active_for_actor(&self, actor_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sessions \
             WHERE actor_id = $1 AND revoked = FALSE AND expires_at > NOW()",
        )
        .bind(actor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::db_err("Failed to count active sessions", e))
    }
}
