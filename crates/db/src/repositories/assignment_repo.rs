//! Repository for the `assignments` table.

use locker_core::assignment::{Assignment, SignatureAttachment};
use sqlx::PgPool;

/// Column list for `assignments` queries.
const COLUMNS: &str = "\
    id, locker_id, student_id, assigned_at, signature_id, \
    signature_base64, signature_completed_at";

pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Insert a new assignment. `uq_assignments_locker_id` rejects a second
    /// assignment for the same locker with a unique violation.
    pub async fn create(pool: &PgPool, assignment: &Assignment) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO assignments \
                (id, locker_id, student_id, assigned_at, signature_id, \
                 signature_base64, signature_completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&assignment.id)
        .bind(&assignment.locker_id)
        .bind(&assignment.student_id)
        .bind(assignment.assigned_at)
        .bind(&assignment.signature_id)
        .bind(&assignment.signature_base64)
        .bind(assignment.signature_completed_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_locker(
        pool: &PgPool,
        locker_id: &str,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE locker_id = $1");
        sqlx::query_as::<_, Assignment>(&query)
            .bind(locker_id)
            .fetch_optional(pool)
            .await
    }

    /// All assignments, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Assignment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assignments ORDER BY assigned_at DESC");
        sqlx::query_as::<_, Assignment>(&query).fetch_all(pool).await
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn attach_signature(
        pool: &PgPool,
        id: &str,
        attachment: &SignatureAttachment,
    ) -> Result<Option<Assignment>, sqlx::Error> {
        let query = format!(
            "UPDATE assignments \
             SET signature_id = $2, signature_base64 = $3, signature_completed_at = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&query)
            .bind(id)
            .bind(&attachment.signature_id)
            .bind(&attachment.signature_base64)
            .bind(attachment.completed_at)
            .fetch_optional(pool)
            .await
    }
}
