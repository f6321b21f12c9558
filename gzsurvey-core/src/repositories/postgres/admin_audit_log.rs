// File: gzsurvey-core/src/repositories/postgres/admin_audit_log.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use gzsurvey_common::error::Error;
use gzsurvey_common::models::{AdminAuditLogEntry, AuditAction};
use gzsurvey_common::traits::AdminAuditLogRepository;

#[derive(Clone)]
pub struct PostgresAdminAuditLogRepository {
    pool: Pool<Postgres>,
}

impl PostgresAdminAuditLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminAuditLogRepository for PostgresAdminAuditLogRepository {
    async fn insert_entry(&self, entry: &AdminAuditLogEntry) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO admin_audit_log (
                audit_id, admin_id, action, resource_type, resource_id,
                ip_address, user_agent, details, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
            .bind(entry.audit_id)
            .bind(entry.admin_id)
            .bind(entry.action.as_str())
            .bind(&entry.resource_type)
            .bind(&entry.resource_id)
            .bind(&entry.ip_address)
            .bind(&entry.user_agent)
            .bind(entry.details.as_ref().map(Json))
            .bind(entry.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_admin(&self, admin_id: Uuid, limit: i64) -> Result<Vec<AdminAuditLogEntry>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT audit_id, admin_id, action, resource_type, resource_id,
                   ip_address, user_agent, details, created_at
            FROM admin_audit_log
            WHERE admin_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
            .bind(admin_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for r in rows {
            let action: String = r.try_get("action")?;
            let details: Option<Json<Value>> = r.try_get("details")?;
            results.push(AdminAuditLogEntry {
                audit_id: r.try_get("audit_id")?,
                admin_id: r.try_get("admin_id")?,
                action: action.parse::<AuditAction>()?,
                resource_type: r.try_get("resource_type")?,
                resource_id: r.try_get("resource_id")?,
                ip_address: r.try_get("ip_address")?,
                user_agent: r.try_get("user_agent")?,
                details: details.map(|d| d.0),
                created_at: r.try_get("created_at")?,
            });
        }
        Ok(results)
    }
}
