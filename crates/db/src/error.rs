use locker_core::error::StoreError;

/// SQLSTATE `insufficient_privilege`.
const INSUFFICIENT_PRIVILEGE: &str = "42501";
/// SQLSTATE `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Classify a sqlx error into the store taxonomy.
///
/// - `42501` maps to [`StoreError::PermissionDenied`].
/// - `23505` maps to [`StoreError::Conflict`], naming the constraint.
/// - Pool exhaustion and transport failures map to [`StoreError::Unavailable`].
/// - Everything else is [`StoreError::Backend`].
pub fn classify(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some(INSUFFICIENT_PRIVILEGE) => StoreError::PermissionDenied(db_err.message().to_string()),
            Some(UNIQUE_VIOLATION) => StoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {}",
                db_err.constraint().unwrap_or("unknown")
            )),
            _ => StoreError::Backend(err.to_string()),
        },
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}
