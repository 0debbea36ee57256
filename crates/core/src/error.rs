use crate::locker::Axis;

/// Failure reported by a [`Store`](crate::store::Store) implementation.
///
/// Store errors are never retried by the core; they are surfaced to the
/// caller, which must re-trigger the action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store refused access for the current principal.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The backing store could not be reached (network, pool exhaustion).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness or conditional-write guard rejected the write.
    #[error("Store conflict: {0}")]
    Conflict(String),

    /// Any other backend failure.
    #[error("Store error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The locker already holds an active assignment.
    #[error("Locker {locker_id} is already occupied")]
    AlreadyOccupied { locker_id: String },

    /// Shrinking would remove the only remaining locker on an axis.
    #[error("Cannot remove the last remaining {axis}")]
    LastElement { axis: Axis },

    /// The terminal locker of an axis is occupied and cannot be removed.
    #[error("Cannot remove occupied locker {locker_id}. Remove the student first")]
    OccupiedAxisElement { locker_id: String },

    /// Signature export was requested before anything was drawn.
    #[error("Signature canvas is empty")]
    EmptyCanvas,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The primary mutation succeeded but a dependent cleanup step failed.
    #[error("{completed} succeeded but {failed}")]
    PartialFailure { completed: String, failed: String },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(msg) => CoreError::PermissionDenied(msg),
            other => CoreError::Store(other),
        }
    }
}
