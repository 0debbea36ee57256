//! Repository for the `lockers` table.

use locker_core::locker::{self, Locker};
use locker_core::types::Timestamp;
use sqlx::PgPool;

/// Column list for `lockers` queries.
const COLUMNS: &str = "\
    id, number, row_index, column_index, is_occupied, student_id, \
    assigned_at, is_broken, broken_remarks";

pub struct LockerRepo;

impl LockerRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lockers WHERE id = $1");
        sqlx::query_as::<_, Locker>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All lockers in display order (numeric value of `number`).
    pub async fn list(pool: &PgPool) -> Result<Vec<Locker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lockers");
        let mut lockers = sqlx::query_as::<_, Locker>(&query).fetch_all(pool).await?;
        locker::sort_by_number(&mut lockers);
        Ok(lockers)
    }

    /// Insert unless the id already exists. Returns `true` when a row was written.
    pub async fn insert_if_absent(pool: &PgPool, locker: &Locker) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO lockers \
                (id, number, row_index, column_index, is_occupied, student_id, \
                 assigned_at, is_broken, broken_remarks) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&locker.id)
        .bind(&locker.number)
        .bind(locker.row)
        .bind(locker.column)
        .bind(locker.is_occupied)
        .bind(&locker.student_id)
        .bind(locker.assigned_at)
        .bind(locker.is_broken)
        .bind(&locker.broken_remarks)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Delete the locker only while `is_occupied = false`.
    pub async fn delete_if_vacant(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lockers WHERE id = $1 AND is_occupied = FALSE")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Conditional occupy: only flips a vacant locker.
    pub async fn occupy(
        pool: &PgPool,
        id: &str,
        student_id: &str,
        at: Timestamp,
    ) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!(
            "UPDATE lockers SET is_occupied = TRUE, student_id = $2, assigned_at = $3 \
             WHERE id = $1 AND is_occupied = FALSE \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(id)
            .bind(student_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    pub async fn vacate(pool: &PgPool, id: &str) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!(
            "UPDATE lockers SET is_occupied = FALSE, student_id = NULL, assigned_at = NULL \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_broken(
        pool: &PgPool,
        id: &str,
        is_broken: bool,
        remarks: Option<&str>,
    ) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!(
            "UPDATE lockers SET is_broken = $2, broken_remarks = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(id)
            .bind(is_broken)
            .bind(remarks)
            .fetch_optional(pool)
            .await
    }
}
