// File: gzsurvey-core/src/repositories/postgres/admin_users.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use gzsurvey_common::error::Error;
use gzsurvey_common::models::{AdminUser, ProfileUpdate};
use gzsurvey_common::traits::AdminUserRepository;

#[derive(Clone)]
pub struct PostgresAdminUserRepository {
    pool: Pool<Postgres>,
}

impl PostgresAdminUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(r: &PgRow) -> Result<AdminUser, Error> {
        Ok(AdminUser {
            id: r.try_get("id")?,
            email: r.try_get("email")?,
            password_hash: r.try_get("password_hash")?,
            brand: r.try_get("brand")?,
            branch: r.try_get("branch")?,
            role: r.try_get("role")?,
            is_active: r.try_get("is_active")?,
            display_name: r.try_get("display_name")?,
            profile_pic: r.try_get("profile_pic")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl AdminUserRepository for PostgresAdminUserRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<AdminUser>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, brand, branch, role,
                   is_active, display_name, profile_pic, created_at
            FROM admin_users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn get_admin(&self, admin_id: Uuid) -> Result<Option<AdminUser>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, brand, branch, role,
                   is_active, display_name, profile_pic, created_at
            FROM admin_users
            WHERE id = $1
            "#,
        )
            .bind(admin_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn update_password_hash(&self, admin_id: Uuid, password_hash: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE admin_users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
            .bind(admin_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        admin_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<AdminUser>, Error> {
        let row = sqlx::query(
            r#"
            UPDATE admin_users
            SET display_name = COALESCE($2, display_name),
                profile_pic  = COALESCE($3, profile_pic)
            WHERE id = $1
            RETURNING id, email, password_hash, brand, branch, role,
                      is_active, display_name, profile_pic, created_at
            "#,
        )
            .bind(admin_id)
            .bind(&update.display_name)
            .bind(&update.profile_pic)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }
}
