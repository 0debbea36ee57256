//! Persisted signature records.

use serde::{Deserialize, Serialize};

use super::{CaptureScript, SignatureImage};
use crate::assignment::{Assignment, SignatureAttachment};
use crate::error::CoreError;
use crate::store::Store;
use crate::student::Student;
use crate::types::{DocId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SignatureRecord {
    pub id: DocId,
    pub student_id: DocId,
    pub student_name: String,
    pub student_school_number: String,
    /// PNG data URL.
    pub signature_base64: String,
    pub created_at: Timestamp,
    pub locker_id: Option<DocId>,
    pub assignment_id: Option<DocId>,
}

impl SignatureRecord {
    pub fn new(
        student: &Student,
        assignment: Option<&Assignment>,
        signature_base64: String,
        at: Timestamp,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            student_school_number: student.school_number.clone(),
            signature_base64,
            created_at: at,
            locker_id: assignment.map(|a| a.locker_id.clone()),
            assignment_id: assignment.map(|a| a.id.clone()),
        }
    }
}

/// A stored signature together with the assignment it was attached to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedSignature {
    pub record: SignatureRecord,
    pub assignment: Option<Assignment>,
}

/// Store `image` for `student` and, when given, attach it to `assignment`.
pub async fn record_signature(
    store: &dyn Store,
    student: &Student,
    assignment: Option<&Assignment>,
    image: &SignatureImage,
    now: Timestamp,
) -> Result<CapturedSignature, CoreError> {
    let record = SignatureRecord::new(student, assignment, image.to_data_url(), now);
    store.insert_signature(&record).await?;

    let attached = match assignment {
        Some(assignment) => {
            let attachment = SignatureAttachment {
                signature_id: record.id.clone(),
                signature_base64: record.signature_base64.clone(),
                completed_at: now,
            };
            let updated = store
                .attach_signature(&assignment.id, &attachment)
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    entity: "Assignment",
                    id: assignment.id.clone(),
                })?;
            Some(updated)
        }
        None => None,
    };

    tracing::info!(
        signature_id = %record.id,
        student_id = %student.id,
        assignment_id = ?attached.as_ref().map(|a| a.id.as_str()),
        "Signature recorded",
    );
    Ok(CapturedSignature {
        record,
        assignment: attached,
    })
}

/// Replay `script` for the student holding `assignment_id` and attach the
/// resulting image to that assignment.
///
/// The script is rendered before anything is written, so an empty canvas
/// leaves the store untouched.
pub async fn capture_for_assignment(
    store: &dyn Store,
    assignment_id: &str,
    script: &CaptureScript,
    now: Timestamp,
) -> Result<CapturedSignature, CoreError> {
    let assignment = store
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Assignment",
            id: assignment_id.to_string(),
        })?;

    let script = script.clone();
    let image = tokio::task::spawn_blocking(move || script.render())
        .await
        .map_err(|e| CoreError::Internal(format!("Signature render task failed: {e}")))??;

    let student = store
        .get_response(&assignment.student_id)
        .await?
        .map(|response| Student::from_response(&response))
        .ok_or_else(|| CoreError::NotFound {
            entity: "Student",
            id: assignment.student_id.clone(),
        })?;

    record_signature(store, &student, Some(&assignment), &image, now).await
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::assignment;
    use crate::grid;
    use crate::signature::pad::{PadConfig, PadEvent, PointerKind};
    use crate::store::memory::MemoryStore;
    use crate::student::{Response, StudentData};
    use crate::types::Principal;

    fn stroke() -> Vec<PadEvent> {
        vec![
            PadEvent::Down {
                pointer: PointerKind::Mouse,
                x: 20.0,
                y: 20.0,
            },
            PadEvent::Move {
                pointer: PointerKind::Mouse,
                x: 120.0,
                y: 60.0,
            },
            PadEvent::Up,
        ]
    }

    async fn assigned() -> (MemoryStore, Assignment) {
        let store = MemoryStore::new();
        let admin = Principal {
            id: "admin".into(),
            role: "admin".into(),
        };
        grid::initialize(&store, Some(&admin)).await.unwrap();
        let response = Response {
            id: "resp-1".into(),
            form_id: "default".into(),
            student_data: StudentData {
                name: "Tan Wei".into(),
                school_number: "S1".into(),
                class: "3A".into(),
                contact_number: "0123".into(),
            },
            raw_data: serde_json::json!({}),
            submitted_at: chrono::Utc::now(),
        };
        store.insert_response(&response).await.unwrap();
        let outcome = assignment::assign(
            &store,
            "locker_1003",
            &Student::from_response(&response),
            chrono::Utc::now(),
        )
        .await
        .unwrap();
        (store, outcome.assignment)
    }

    #[tokio::test]
    async fn capture_attaches_to_assignment() {
        let (store, assignment) = assigned().await;
        let script = CaptureScript {
            pad: PadConfig::default(),
            container_width: 400.0,
            events: stroke(),
        };

        let captured = capture_for_assignment(&store, &assignment.id, &script, chrono::Utc::now())
            .await
            .unwrap();
        assert_eq!(captured.record.student_name, "Tan Wei");
        assert_eq!(captured.record.locker_id.as_deref(), Some("locker_1003"));

        let stored = store.get_assignment(&assignment.id).await.unwrap().unwrap();
        assert!(stored.is_signed());
        assert_eq!(stored.signature_id.as_deref(), Some(captured.record.id.as_str()));
        assert_eq!(store.list_signatures().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_capture_writes_nothing() {
        let (store, assignment) = assigned().await;
        let script = CaptureScript {
            pad: PadConfig::default(),
            container_width: 400.0,
            events: vec![],
        };

        assert_matches!(
            capture_for_assignment(&store, &assignment.id, &script, chrono::Utc::now()).await,
            Err(CoreError::EmptyCanvas)
        );
        assert!(store.list_signatures().await.unwrap().is_empty());
        assert!(!store.get_assignment(&assignment.id).await.unwrap().unwrap().is_signed());
    }

    #[tokio::test]
    async fn capture_for_unknown_assignment_fails() {
        let store = MemoryStore::new();
        let script = CaptureScript {
            pad: PadConfig::default(),
            container_width: 400.0,
            events: stroke(),
        };
        assert_matches!(
            capture_for_assignment(&store, "assignment_0_locker_1001", &script, chrono::Utc::now()).await,
            Err(CoreError::NotFound { entity: "Assignment", .. })
        );
    }
}
