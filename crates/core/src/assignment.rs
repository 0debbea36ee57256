//! Locker assignment state machine.
//!
//! Occupancy: `Available --assign--> Occupied --unassign--> Available`.
//! The broken flag is orthogonal and toggled by [`mark_broken`] /
//! [`clear_broken`] in any occupancy state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::locker::Locker;
use crate::store::Store;
use crate::student::Student;
use crate::types::{DocId, Timestamp};

/// Prefix of every assignment document id.
pub const ASSIGNMENT_ID_PREFIX: &str = "assignment_";

/// The binding between a locker and a registered student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Assignment {
    pub id: DocId,
    pub locker_id: DocId,
    /// Id of the registration response the student was projected from.
    pub student_id: DocId,
    pub assigned_at: Timestamp,
    pub signature_id: Option<DocId>,
    pub signature_base64: Option<String>,
    pub signature_completed_at: Option<Timestamp>,
}

impl Assignment {
    /// A fresh assignment with an id of the form
    /// `assignment_<epoch millis>_<locker id>`.
    pub fn new(locker_id: &str, student_id: &str, at: Timestamp) -> Self {
        Self {
            id: format!("{ASSIGNMENT_ID_PREFIX}{}_{locker_id}", at.timestamp_millis()),
            locker_id: locker_id.to_string(),
            student_id: student_id.to_string(),
            assigned_at: at,
            signature_id: None,
            signature_base64: None,
            signature_completed_at: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature_completed_at.is_some()
    }
}

/// Signature fields written onto an assignment once the student has signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureAttachment {
    pub signature_id: DocId,
    pub signature_base64: String,
    pub completed_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Assign
// ---------------------------------------------------------------------------

/// Result of a successful [`assign`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignOutcome {
    pub locker: Locker,
    pub assignment: Assignment,
}

/// Bind `student` to an available locker.
///
/// The occupancy flip is a conditional write, so two admins racing for the
/// same locker cannot both succeed. If the assignment document cannot be
/// written afterwards the locker is released again.
pub async fn assign(
    store: &dyn Store,
    locker_id: &str,
    student: &Student,
    now: Timestamp,
) -> Result<AssignOutcome, CoreError> {
    let locker = store
        .get_locker(locker_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Locker",
            id: locker_id.to_string(),
        })?;

    if locker.is_occupied || store.find_assignment_by_locker(locker_id).await?.is_some() {
        return Err(CoreError::AlreadyOccupied {
            locker_id: locker_id.to_string(),
        });
    }

    let locker = store
        .occupy_locker(locker_id, &student.id, now)
        .await?
        .ok_or_else(|| CoreError::AlreadyOccupied {
            locker_id: locker_id.to_string(),
        })?;

    let assignment = Assignment::new(locker_id, &student.id, now);
    if let Err(e) = store.insert_assignment(&assignment).await {
        tracing::warn!(locker_id, error = %e, "Assignment write failed, releasing locker");
        if let Err(rollback) = store.vacate_locker(locker_id).await {
            tracing::error!(locker_id, error = %rollback, "Failed to release locker after assignment error");
        }
        return Err(match e {
            crate::error::StoreError::Conflict(_) => CoreError::AlreadyOccupied {
                locker_id: locker_id.to_string(),
            },
            other => other.into(),
        });
    }

    tracing::info!(
        locker_id,
        student_id = %student.id,
        assignment_id = %assignment.id,
        "Locker assigned",
    );
    Ok(AssignOutcome { locker, assignment })
}

// ---------------------------------------------------------------------------
// Unassign
// ---------------------------------------------------------------------------

/// Result of an [`unassign`]. The locker is released even when signature
/// cleanup fails; that failure is carried in `signature_cleanup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnassignOutcome {
    pub locker: Locker,
    pub removed_assignment: Assignment,
    pub signatures_removed: u64,
    /// Error message from the signature cleanup step, if it failed.
    pub signature_cleanup: Option<String>,
}

impl UnassignOutcome {
    /// Partial-failure warning to surface alongside the success.
    pub fn warning(&self) -> Option<CoreError> {
        self.signature_cleanup
            .as_ref()
            .map(|failed| CoreError::PartialFailure {
                completed: format!("Unassigning {}", self.locker.id),
                failed: format!("signature cleanup failed: {failed}"),
            })
    }
}

/// Release a locker from `assignment_id`.
///
/// Deletes the assignment, resets the locker, then removes signature
/// records for the `(student, locker)` pair on a best-effort basis.
pub async fn unassign(
    store: &dyn Store,
    locker_id: &str,
    assignment_id: &str,
) -> Result<UnassignOutcome, CoreError> {
    let assignment = store
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Assignment",
            id: assignment_id.to_string(),
        })?;

    if assignment.locker_id != locker_id {
        return Err(CoreError::Validation(format!(
            "Assignment {assignment_id} does not belong to locker {locker_id}"
        )));
    }

    store.delete_assignment(assignment_id).await?;

    // The assignment is gone from here on; a failure to release the locker
    // is reported as partial so callers still publish the removal.
    let locker = match store.vacate_locker(locker_id).await {
        Ok(Some(locker)) => locker,
        Ok(None) => {
            tracing::error!(locker_id, assignment_id, "Assignment removed but locker is missing");
            return Err(CoreError::PartialFailure {
                completed: format!("Removing assignment {assignment_id}"),
                failed: format!("locker {locker_id} not found"),
            });
        }
        Err(e) => {
            tracing::error!(
                locker_id,
                assignment_id,
                error = %e,
                "Assignment removed but locker could not be released",
            );
            return Err(CoreError::PartialFailure {
                completed: format!("Removing assignment {assignment_id}"),
                failed: format!("releasing locker {locker_id}: {e}"),
            });
        }
    };

    let (signatures_removed, signature_cleanup) = match store
        .delete_signatures_for(&assignment.student_id, locker_id)
        .await
    {
        Ok(n) => (n, None),
        Err(e) => {
            tracing::warn!(locker_id, error = %e, "Signature cleanup failed after unassign");
            (0, Some(e.to_string()))
        }
    };

    tracing::info!(locker_id, assignment_id, signatures_removed, "Locker unassigned");
    Ok(UnassignOutcome {
        locker,
        removed_assignment: assignment,
        signatures_removed,
        signature_cleanup,
    })
}

/// Release whichever assignment currently holds `locker_id`.
pub async fn unassign_locker(
    store: &dyn Store,
    locker_id: &str,
) -> Result<UnassignOutcome, CoreError> {
    let assignment = store
        .find_assignment_by_locker(locker_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Assignment",
            id: locker_id.to_string(),
        })?;
    unassign(store, locker_id, &assignment.id).await
}

// ---------------------------------------------------------------------------
// Broken flag
// ---------------------------------------------------------------------------

/// Flag a locker as broken. Remarks are trimmed; blank remarks are stored
/// as absent.
pub async fn mark_broken(
    store: &dyn Store,
    locker_id: &str,
    remarks: &str,
) -> Result<Locker, CoreError> {
    let remarks = remarks.trim();
    let remarks = (!remarks.is_empty()).then_some(remarks);
    let locker = store
        .set_broken(locker_id, true, remarks)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Locker",
            id: locker_id.to_string(),
        })?;
    tracing::info!(locker_id, "Locker marked broken");
    Ok(locker)
}

pub async fn clear_broken(store: &dyn Store, locker_id: &str) -> Result<Locker, CoreError> {
    let locker = store
        .set_broken(locker_id, false, None)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Locker",
            id: locker_id.to_string(),
        })?;
    tracing::info!(locker_id, "Locker broken flag cleared");
    Ok(locker)
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// The student currently holding `locker_id`, if any.
///
/// `Ok(None)` when the locker has no assignment or the registration the
/// assignment points at no longer exists.
pub async fn resolve_assigned_student(
    store: &dyn Store,
    locker_id: &str,
) -> Result<Option<Student>, CoreError> {
    let Some(assignment) = store.find_assignment_by_locker(locker_id).await? else {
        return Ok(None);
    };
    Ok(store
        .get_response(&assignment.student_id)
        .await?
        .map(|response| Student::from_response(&response)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
