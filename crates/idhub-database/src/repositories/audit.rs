//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use idhub_core::error::{AppError, ErrorKind};
use idhub_core::result::AppResult;
use idhub_entity::audit::{AuditEvent, AuditSink};

/// Append-only repository for audit events.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn append(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log \
             (actor_id, actor_kind, tenant_id, action, resource, metadata, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(event.actor_id)
        .bind(event.actor_kind)
        .bind(event.tenant_id)
        .bind(&event.action)
        .bind(&event.resource)
        .bind(&event.metadata)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append audit event", e)
        })?;
        Ok(())
    }
}
