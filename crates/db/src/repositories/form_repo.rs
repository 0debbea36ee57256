//! Repository for the `forms` table.

use locker_core::form::RegistrationForm;
use sqlx::types::Json;
use sqlx::PgPool;

/// Column list for `forms` queries.
const COLUMNS: &str = "id, title, description, is_active, fields, created_at, created_by";

pub struct FormRepo;

impl FormRepo {
    pub async fn create(pool: &PgPool, form: &RegistrationForm) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO forms (id, title, description, is_active, fields, created_at, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&form.id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.is_active)
        .bind(Json(&form.fields))
        .bind(form.created_at)
        .bind(&form.created_by)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<RegistrationForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, RegistrationForm>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All forms, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<RegistrationForm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms ORDER BY created_at DESC");
        sqlx::query_as::<_, RegistrationForm>(&query)
            .fetch_all(pool)
            .await
    }

    /// Overwrite the editable columns. Returns `true` if the form existed.
    pub async fn update(pool: &PgPool, form: &RegistrationForm) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE forms SET title = $2, description = $3, is_active = $4, fields = $5 \
             WHERE id = $1",
        )
        .bind(&form.id)
        .bind(&form.title)
        .bind(&form.description)
        .bind(form.is_active)
        .bind(Json(&form.fields))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
