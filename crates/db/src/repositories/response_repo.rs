//! Repository for the `responses` table.

use locker_core::student::Response;
use sqlx::types::Json;
use sqlx::PgPool;

/// Column list for `responses` queries.
const COLUMNS: &str = "id, form_id, student_data, raw_data, submitted_at";

pub struct ResponseRepo;

impl ResponseRepo {
    pub async fn create(pool: &PgPool, response: &Response) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO responses (id, form_id, student_data, raw_data, submitted_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&response.id)
        .bind(&response.form_id)
        .bind(Json(&response.student_data))
        .bind(&response.raw_data)
        .bind(response.submitted_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Response>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM responses WHERE id = $1");
        sqlx::query_as::<_, Response>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All responses, newest submission first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Response>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM responses ORDER BY submitted_at DESC");
        sqlx::query_as::<_, Response>(&query).fetch_all(pool).await
    }

    /// Delete every response whose id is in `ids`. Returns the number removed.
    pub async fn delete_many(pool: &PgPool, ids: &[String]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM responses WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
