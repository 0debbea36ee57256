//! Repository for the `signatures` table.

use locker_core::signature::record::SignatureRecord;
use sqlx::PgPool;

/// Column list for `signatures` queries.
const COLUMNS: &str = "\
    id, student_id, student_name, student_school_number, signature_base64, \
    created_at, locker_id, assignment_id";

pub struct SignatureRepo;

impl SignatureRepo {
    pub async fn create(pool: &PgPool, record: &SignatureRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO signatures \
                (id, student_id, student_name, student_school_number, signature_base64, \
                 created_at, locker_id, assignment_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&record.id)
        .bind(&record.student_id)
        .bind(&record.student_name)
        .bind(&record.student_school_number)
        .bind(&record.signature_base64)
        .bind(record.created_at)
        .bind(&record.locker_id)
        .bind(&record.assignment_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All signature records, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SignatureRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM signatures ORDER BY created_at DESC");
        sqlx::query_as::<_, SignatureRecord>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn delete_for_student_locker(
        pool: &PgPool,
        student_id: &str,
        locker_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM signatures WHERE student_id = $1 AND locker_id = $2")
            .bind(student_id)
            .bind(locker_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
