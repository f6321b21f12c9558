// File: gzsurvey-core/src/repositories/postgres/survey_responses.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::warn;
use uuid::Uuid;
use gzsurvey_common::error::Error;
use gzsurvey_common::models::{
    Answers, Completion, Redemption, SurveyResponse, TicketStatus,
};
use gzsurvey_common::traits::SurveyResponseRepository;

const SELECT_COLUMNS: &str = r#"
    id, receipt, brand, branch, answers,
    created_at, completed_at,
    reward_code, reward_generated_at,
    reward_claimed, reward_claimed_at, reward_claimed_by,
    reward_claimed_branch, reward_claimed_brand,
    ticket_status
"#;

#[derive(Clone)]
pub struct PostgresSurveyResponseRepository {
    pool: Pool<Postgres>,
}

impl PostgresSurveyResponseRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn map_row(r: &PgRow) -> Result<SurveyResponse, Error> {
        let id: Uuid = r.try_get("id")?;
        let raw_answers: Json<Value> = r.try_get("answers")?;
        // Rows written before the whitelist existed may hold shapes we no longer accept.
        let answers: Answers = serde_json::from_value(raw_answers.0).unwrap_or_else(|e| {
            warn!("survey_responses {}: unreadable answers column ({}), treating as empty", id, e);
            Answers::new()
        });
        let status: String = r.try_get("ticket_status")?;

        Ok(SurveyResponse {
            id,
            receipt: r.try_get("receipt")?,
            brand: r.try_get("brand")?,
            branch: r.try_get("branch")?,
            answers,
            created_at: r.try_get("created_at")?,
            completed_at: r.try_get("completed_at")?,
            reward_code: r.try_get("reward_code")?,
            reward_generated_at: r.try_get("reward_generated_at")?,
            reward_claimed: r.try_get("reward_claimed")?,
            reward_claimed_at: r.try_get("reward_claimed_at")?,
            reward_claimed_by: r.try_get("reward_claimed_by")?,
            reward_claimed_branch: r.try_get("reward_claimed_branch")?,
            reward_claimed_brand: r.try_get("reward_claimed_brand")?,
            ticket_status: status.parse::<TicketStatus>()?,
        })
    }

    async fn fetch_one_where(&self, clause: &str, receipt: &str) -> Result<Option<SurveyResponse>, Error> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM survey_responses WHERE receipt = $1 AND {clause} LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .bind(receipt)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }
}

#[async_trait]
impl SurveyResponseRepository for PostgresSurveyResponseRepository {
    async fn create_response(&self, response: &SurveyResponse) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO survey_responses (
                id, receipt, brand, branch, answers, created_at, ticket_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
            .bind(response.id)
            .bind(&response.receipt)
            .bind(&response.brand)
            .bind(&response.branch)
            .bind(Json(&response.answers))
            .bind(response.created_at)
            .bind(response.ticket_status.as_str())
            .execute(&self.pool)
            .await
            .map_err(Error::from_db)?;
        Ok(())
    }

    async fn get_response(&self, id: Uuid) -> Result<Option<SurveyResponse>, Error> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM survey_responses WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn find_open_by_receipt(&self, receipt: &str) -> Result<Option<SurveyResponse>, Error> {
        self.fetch_one_where("completed_at IS NULL", receipt).await
    }

    async fn find_completed_by_receipt(&self, receipt: &str) -> Result<Option<SurveyResponse>, Error> {
        self.fetch_one_where("completed_at IS NOT NULL AND reward_code IS NOT NULL", receipt).await
    }

    async fn complete_response(&self, id: Uuid, completion: &Completion) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE survey_responses
            SET answers             = COALESCE($2, answers),
                completed_at        = $3,
                reward_code         = $4,
                reward_generated_at = $3,
                brand               = COALESCE(brand, $5),
                branch              = COALESCE(branch, $6)
            WHERE id = $1
              AND completed_at IS NULL
            "#,
        )
            .bind(id)
            .bind(completion.answers.as_ref().map(Json))
            .bind(completion.completed_at)
            .bind(&completion.reward_code)
            .bind(&completion.brand)
            .bind(&completion.branch)
            .execute(&self.pool)
            .await
            .map_err(Error::from_db)?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_redeemed(&self, id: Uuid, redemption: &Redemption) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE survey_responses
            SET reward_claimed        = TRUE,
                reward_claimed_at     = $2,
                reward_claimed_by     = $3,
                reward_claimed_branch = $4,
                reward_claimed_brand  = $5
            WHERE id = $1
              AND reward_claimed = FALSE
              AND completed_at IS NOT NULL
              AND reward_code IS NOT NULL
            "#,
        )
            .bind(id)
            .bind(redemption.claimed_at)
            .bind(&redemption.claimed_by)
            .bind(&redemption.claimed_branch)
            .bind(&redemption.claimed_brand)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_ticket_status(&self, id: Uuid, status: TicketStatus) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE survey_responses
            SET ticket_status = $2
            WHERE id = $1
            "#,
        )
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_missing_brand_branch(&self) -> Result<Vec<SurveyResponse>, Error> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM survey_responses \
             WHERE (brand IS NULL OR branch IS NULL) AND receipt IS NOT NULL \
             ORDER BY created_at"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut results = Vec::with_capacity(rows.len());
        for r in &rows {
            results.push(Self::map_row(r)?);
        }
        Ok(results)
    }

    async fn fill_brand_branch(
        &self,
        id: Uuid,
        brand: Option<&str>,
        branch: Option<&str>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE survey_responses
            SET brand  = COALESCE(brand, $2),
                branch = COALESCE(branch, $3)
            WHERE id = $1
              AND (brand IS NULL OR branch IS NULL)
            "#,
        )
            .bind(id)
            .bind(brand)
            .bind(branch)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
