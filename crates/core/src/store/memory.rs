//! In-process [`Store`] backed by ordered maps behind a `tokio` lock.
//!
//! Conditional writes take the write lock for the whole check-and-set, so
//! they are atomic with respect to every other call on the same store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Store;
use crate::assignment::{Assignment, SignatureAttachment};
use crate::error::StoreError;
use crate::form::RegistrationForm;
use crate::locker::{self, Locker};
use crate::signature::record::SignatureRecord;
use crate::student::Response;
use crate::types::{DocId, Timestamp};

#[derive(Debug, Default)]
struct Collections {
    lockers: BTreeMap<DocId, Locker>,
    assignments: BTreeMap<DocId, Assignment>,
    responses: BTreeMap<DocId, Response>,
    forms: BTreeMap<DocId, RegistrationForm>,
    signatures: BTreeMap<DocId, SignatureRecord>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // -----------------------------------------------------------------------
    // Lockers
    // -----------------------------------------------------------------------

    async fn get_locker(&self, id: &str) -> Result<Option<Locker>, StoreError> {
        Ok(self.inner.read().await.lockers.get(id).cloned())
    }

    async fn list_lockers(&self) -> Result<Vec<Locker>, StoreError> {
        let mut lockers: Vec<Locker> = self.inner.read().await.lockers.values().cloned().collect();
        locker::sort_by_number(&mut lockers);
        Ok(lockers)
    }

    async fn insert_locker_if_absent(&self, locker: &Locker) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.lockers.contains_key(&locker.id) {
            return Ok(false);
        }
        inner.lockers.insert(locker.id.clone(), locker.clone());
        Ok(true)
    }

    async fn delete_locker_if_vacant(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.lockers.get(id) {
            Some(l) if !l.is_occupied => {
                inner.lockers.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn occupy_locker(
        &self,
        id: &str,
        student_id: &str,
        at: Timestamp,
    ) -> Result<Option<Locker>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.lockers.get_mut(id) {
            Some(l) if !l.is_occupied => {
                l.is_occupied = true;
                l.student_id = Some(student_id.to_string());
                l.assigned_at = Some(at);
                Ok(Some(l.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn vacate_locker(&self, id: &str) -> Result<Option<Locker>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.lockers.get_mut(id).map(|l| {
            l.is_occupied = false;
            l.student_id = None;
            l.assigned_at = None;
            l.clone()
        }))
    }

    async fn set_broken(
        &self,
        id: &str,
        is_broken: bool,
        remarks: Option<&str>,
    ) -> Result<Option<Locker>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.lockers.get_mut(id).map(|l| {
            l.is_broken = is_broken;
            l.broken_remarks = remarks.map(str::to_string);
            l.clone()
        }))
    }

    // -----------------------------------------------------------------------
    // Assignments
    // -----------------------------------------------------------------------

    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .assignments
            .values()
            .any(|a| a.locker_id == assignment.locker_id)
        {
            return Err(StoreError::Conflict(format!(
                "locker {} already has an assignment",
                assignment.locker_id
            )));
        }
        if inner.assignments.contains_key(&assignment.id) {
            return Err(StoreError::Conflict(format!(
                "assignment {} already exists",
                assignment.id
            )));
        }
        inner
            .assignments
            .insert(assignment.id.clone(), assignment.clone());
        Ok(())
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        Ok(self.inner.read().await.assignments.get(id).cloned())
    }

    async fn find_assignment_by_locker(
        &self,
        locker_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .assignments
            .values()
            .find(|a| a.locker_id == locker_id)
            .cloned())
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        let mut assignments: Vec<Assignment> =
            self.inner.read().await.assignments.values().cloned().collect();
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        Ok(assignments)
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.assignments.remove(id).is_some())
    }

    async fn attach_signature(
        &self,
        assignment_id: &str,
        attachment: &SignatureAttachment,
    ) -> Result<Option<Assignment>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.assignments.get_mut(assignment_id).map(|a| {
            a.signature_id = Some(attachment.signature_id.clone());
            a.signature_base64 = Some(attachment.signature_base64.clone());
            a.signature_completed_at = Some(attachment.completed_at);
            a.clone()
        }))
    }

    // -----------------------------------------------------------------------
    // Registration responses
    // -----------------------------------------------------------------------

    async fn insert_response(&self, response: &Response) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.responses.contains_key(&response.id) {
            return Err(StoreError::Conflict(format!(
                "response {} already exists",
                response.id
            )));
        }
        inner.responses.insert(response.id.clone(), response.clone());
        Ok(())
    }

    async fn get_response(&self, id: &str) -> Result<Option<Response>, StoreError> {
        Ok(self.inner.read().await.responses.get(id).cloned())
    }

    async fn list_responses(&self) -> Result<Vec<Response>, StoreError> {
        let mut responses: Vec<Response> =
            self.inner.read().await.responses.values().cloned().collect();
        responses.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(responses)
    }

    async fn delete_responses(&self, ids: &[String]) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(ids
            .iter()
            .filter(|id| inner.responses.remove(id.as_str()).is_some())
            .count() as u64)
    }

    // -----------------------------------------------------------------------
    // Registration forms
    // -----------------------------------------------------------------------

    async fn insert_form(&self, form: &RegistrationForm) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.forms.contains_key(&form.id) {
            return Err(StoreError::Conflict(format!("form {} already exists", form.id)));
        }
        inner.forms.insert(form.id.clone(), form.clone());
        Ok(())
    }

    async fn get_form(&self, id: &str) -> Result<Option<RegistrationForm>, StoreError> {
        Ok(self.inner.read().await.forms.get(id).cloned())
    }

    async fn list_forms(&self) -> Result<Vec<RegistrationForm>, StoreError> {
        let mut forms: Vec<RegistrationForm> =
            self.inner.read().await.forms.values().cloned().collect();
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(forms)
    }

    async fn update_form(&self, form: &RegistrationForm) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(match inner.forms.get_mut(&form.id) {
            Some(existing) => {
                existing.title = form.title.clone();
                existing.description = form.description.clone();
                existing.is_active = form.is_active;
                existing.fields = form.fields.clone();
                true
            }
            None => false,
        })
    }

    async fn delete_form(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.forms.remove(id).is_some())
    }

    // -----------------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------------

    async fn insert_signature(&self, signature: &SignatureRecord) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .signatures
            .insert(signature.id.clone(), signature.clone());
        Ok(())
    }

    async fn list_signatures(&self) -> Result<Vec<SignatureRecord>, StoreError> {
        let mut signatures: Vec<SignatureRecord> =
            self.inner.read().await.signatures.values().cloned().collect();
        signatures.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(signatures)
    }

    async fn delete_signatures_for(
        &self,
        student_id: &str,
        locker_id: &str,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.signatures.len();
        inner.signatures.retain(|_, s| {
            !(s.student_id == student_id && s.locker_id.as_deref() == Some(locker_id))
        });
        Ok((before - inner.signatures.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locker::Axis;

    #[tokio::test]
    async fn lockers_are_listed_in_numeric_order() {
        let store = MemoryStore::new();
        for i in [10, 2, 7] {
            store
                .insert_locker_if_absent(&Locker::on_axis(Axis::Row, i))
                .await
                .unwrap();
        }
        let numbers: Vec<String> = store
            .list_lockers()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.number)
            .collect();
        assert_eq!(numbers, vec!["1002", "1007", "1010"]);
    }

    #[tokio::test]
    async fn occupy_is_compare_and_swap() {
        let store = MemoryStore::new();
        store
            .insert_locker_if_absent(&Locker::on_axis(Axis::Row, 1))
            .await
            .unwrap();
        let now = chrono::Utc::now();

        assert!(store.occupy_locker("locker_1001", "a", now).await.unwrap().is_some());
        assert!(store.occupy_locker("locker_1001", "b", now).await.unwrap().is_none());
        let locker = store.get_locker("locker_1001").await.unwrap().unwrap();
        assert_eq!(locker.student_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn occupied_locker_is_not_deleted() {
        let store = MemoryStore::new();
        store
            .insert_locker_if_absent(&Locker::on_axis(Axis::Row, 1))
            .await
            .unwrap();
        store
            .occupy_locker("locker_1001", "a", chrono::Utc::now())
            .await
            .unwrap();
        assert!(!store.delete_locker_if_vacant("locker_1001").await.unwrap());

        store.vacate_locker("locker_1001").await.unwrap();
        assert!(store.delete_locker_if_vacant("locker_1001").await.unwrap());
    }

    #[tokio::test]
    async fn second_assignment_for_locker_conflicts() {
        let store = MemoryStore::new();
        let now = chrono::Utc::now();
        store
            .insert_assignment(&Assignment::new("locker_1001", "a", now))
            .await
            .unwrap();
        let err = store
            .insert_assignment(&Assignment::new(
                "locker_1001",
                "b",
                now + chrono::Duration::milliseconds(1),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
