//! A [`Store`] wrapper that injects failures into selected operations.
//!
//! Every call is forwarded to an inner [`MemoryStore`] unless its
//! operation has been switched to fail, in which case it returns
//! [`StoreError::Unavailable`] without touching the inner store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Barrier;

use super::memory::MemoryStore;
use super::Store;
use crate::assignment::{Assignment, SignatureAttachment};
use crate::error::StoreError;
use crate::form::RegistrationForm;
use crate::locker::Locker;
use crate::signature::record::SignatureRecord;
use crate::student::Response;
use crate::types::Timestamp;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    VacateLocker,
    DeleteAssignment,
    InsertAssignment,
    DeleteSignatures,
}

#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Mutex<HashSet<Fault>>,
    occupy_barrier: Option<Arc<Barrier>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every `occupy_locker` call at `barrier` until enough callers
    /// arrive, so concurrent assigns all pass their pre-checks first.
    pub fn with_occupy_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.occupy_barrier = Some(barrier);
        self
    }

    pub fn fail(&self, fault: Fault) {
        self.faults_mut().insert(fault);
    }

    pub fn recover(&self, fault: Fault) {
        self.faults_mut().remove(&fault);
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn faults_mut(&self) -> std::sync::MutexGuard<'_, HashSet<Fault>> {
        self.faults.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, fault: Fault) -> Result<(), StoreError> {
        if self.faults_mut().contains(&fault) {
            Err(StoreError::Unavailable(format!("injected {fault:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for FaultyStore {
    async fn get_locker(&self, id: &str) -> Result<Option<Locker>, StoreError> {
        self.inner.get_locker(id).await
    }

    async fn list_lockers(&self) -> Result<Vec<Locker>, StoreError> {
        self.inner.list_lockers().await
    }

    async fn insert_locker_if_absent(&self, locker: &Locker) -> Result<bool, StoreError> {
        self.inner.insert_locker_if_absent(locker).await
    }

    async fn delete_locker_if_vacant(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete_locker_if_vacant(id).await
    }

    async fn occupy_locker(
        &self,
        id: &str,
        student_id: &str,
        at: Timestamp,
    ) -> Result<Option<Locker>, StoreError> {
        if let Some(barrier) = &self.occupy_barrier {
            barrier.wait().await;
        }
        self.inner.occupy_locker(id, student_id, at).await
    }

    async fn vacate_locker(&self, id: &str) -> Result<Option<Locker>, StoreError> {
        self.check(Fault::VacateLocker)?;
        self.inner.vacate_locker(id).await
    }

    async fn set_broken(
        &self,
        id: &str,
        is_broken: bool,
        remarks: Option<&str>,
    ) -> Result<Option<Locker>, StoreError> {
        self.inner.set_broken(id, is_broken, remarks).await
    }

    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        self.check(Fault::InsertAssignment)?;
        self.inner.insert_assignment(assignment).await
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        self.inner.get_assignment(id).await
    }

    async fn find_assignment_by_locker(
        &self,
        locker_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        self.inner.find_assignment_by_locker(locker_id).await
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        self.inner.list_assignments().await
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError> {
        self.check(Fault::DeleteAssignment)?;
        self.inner.delete_assignment(id).await
    }

    async fn attach_signature(
        &self,
        assignment_id: &str,
        attachment: &SignatureAttachment,
    ) -> Result<Option<Assignment>, StoreError> {
        self.inner.attach_signature(assignment_id, attachment).await
    }

    async fn insert_response(&self, response: &Response) -> Result<(), StoreError> {
        self.inner.insert_response(response).await
    }

    async fn get_response(&self, id: &str) -> Result<Option<Response>, StoreError> {
        self.inner.get_response(id).await
    }

    async fn list_responses(&self) -> Result<Vec<Response>, StoreError> {
        self.inner.list_responses().await
    }

    async fn delete_responses(&self, ids: &[String]) -> Result<u64, StoreError> {
        self.inner.delete_responses(ids).await
    }

    async fn insert_form(&self, form: &RegistrationForm) -> Result<(), StoreError> {
        self.inner.insert_form(form).await
    }

    async fn get_form(&self, id: &str) -> Result<Option<RegistrationForm>, StoreError> {
        self.inner.get_form(id).await
    }

    async fn list_forms(&self) -> Result<Vec<RegistrationForm>, StoreError> {
        self.inner.list_forms().await
    }

    async fn update_form(&self, form: &RegistrationForm) -> Result<bool, StoreError> {
        self.inner.update_form(form).await
    }

    async fn delete_form(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete_form(id).await
    }

    async fn insert_signature(&self, signature: &SignatureRecord) -> Result<(), StoreError> {
        self.inner.insert_signature(signature).await
    }

    async fn list_signatures(&self) -> Result<Vec<SignatureRecord>, StoreError> {
        self.inner.list_signatures().await
    }

    async fn delete_signatures_for(
        &self,
        student_id: &str,
        locker_id: &str,
    ) -> Result<u64, StoreError> {
        self.check(Fault::DeleteSignatures)?;
        self.inner.delete_signatures_for(student_id, locker_id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }
}
