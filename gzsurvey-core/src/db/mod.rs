// gzsurvey-core/src/db/mod.rs

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::Error;

/// Survey submissions wait at most this long for a free connection before
/// the request fails with a database error.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to the gzsurvey Postgres database.
///
/// Cloning shares the underlying pool. Repositories take `pool().clone()`.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        info!(max_connections, "survey database pool ready");
        Ok(Self { pool })
    }

    /// Applies the embedded schema: survey_responses, admin_users and the
    /// append-only admin_audit_log.
    pub async fn apply_schema(&self) -> Result<(), Error> {
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("survey schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Wraps a pool built elsewhere, e.g. by a test harness.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}
