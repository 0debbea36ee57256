//! [`Store`] implementation over a PostgreSQL pool.

use async_trait::async_trait;
use locker_core::assignment::{Assignment, SignatureAttachment};
use locker_core::error::StoreError;
use locker_core::form::RegistrationForm;
use locker_core::locker::Locker;
use locker_core::signature::record::SignatureRecord;
use locker_core::store::Store;
use locker_core::student::Response;
use locker_core::types::Timestamp;

use crate::error::classify;
use crate::repositories::{AssignmentRepo, FormRepo, LockerRepo, ResponseRepo, SignatureRepo};
use crate::DbPool;

/// Delegates each [`Store`] call to the matching repository and maps
/// `sqlx` errors into [`StoreError`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_locker(&self, id: &str) -> Result<Option<Locker>, StoreError> {
        LockerRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn list_lockers(&self) -> Result<Vec<Locker>, StoreError> {
        LockerRepo::list(&self.pool).await.map_err(classify)
    }

    async fn insert_locker_if_absent(&self, locker: &Locker) -> Result<bool, StoreError> {
        LockerRepo::insert_if_absent(&self.pool, locker)
            .await
            .map_err(classify)
    }

    async fn delete_locker_if_vacant(&self, id: &str) -> Result<bool, StoreError> {
        LockerRepo::delete_if_vacant(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn occupy_locker(
        &self,
        id: &str,
        student_id: &str,
        at: Timestamp,
    ) -> Result<Option<Locker>, StoreError> {
        LockerRepo::occupy(&self.pool, id, student_id, at)
            .await
            .map_err(classify)
    }

    async fn vacate_locker(&self, id: &str) -> Result<Option<Locker>, StoreError> {
        LockerRepo::vacate(&self.pool, id).await.map_err(classify)
    }

    async fn set_broken(
        &self,
        id: &str,
        is_broken: bool,
        remarks: Option<&str>,
    ) -> Result<Option<Locker>, StoreError> {
        LockerRepo::set_broken(&self.pool, id, is_broken, remarks)
            .await
            .map_err(classify)
    }

    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError> {
        AssignmentRepo::create(&self.pool, assignment)
            .await
            .map_err(classify)
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        AssignmentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn find_assignment_by_locker(
        &self,
        locker_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        AssignmentRepo::find_by_locker(&self.pool, locker_id)
            .await
            .map_err(classify)
    }

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError> {
        AssignmentRepo::list(&self.pool).await.map_err(classify)
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError> {
        AssignmentRepo::delete(&self.pool, id).await.map_err(classify)
    }

    async fn attach_signature(
        &self,
        assignment_id: &str,
        attachment: &SignatureAttachment,
    ) -> Result<Option<Assignment>, StoreError> {
        AssignmentRepo::attach_signature(&self.pool, assignment_id, attachment)
            .await
            .map_err(classify)
    }

    async fn insert_response(&self, response: &Response) -> Result<(), StoreError> {
        ResponseRepo::create(&self.pool, response)
            .await
            .map_err(classify)
    }

    async fn get_response(&self, id: &str) -> Result<Option<Response>, StoreError> {
        ResponseRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify)
    }

    async fn list_responses(&self) -> Result<Vec<Response>, StoreError> {
        ResponseRepo::list(&self.pool).await.map_err(classify)
    }

    async fn delete_responses(&self, ids: &[String]) -> Result<u64, StoreError> {
        ResponseRepo::delete_many(&self.pool, ids)
            .await
            .map_err(classify)
    }

    async fn insert_form(&self, form: &RegistrationForm) -> Result<(), StoreError> {
        FormRepo::create(&self.pool, form).await.map_err(classify)
    }

    async fn get_form(&self, id: &str) -> Result<Option<RegistrationForm>, StoreError> {
        FormRepo::find_by_id(&self.pool, id).await.map_err(classify)
    }

    async fn list_forms(&self) -> Result<Vec<RegistrationForm>, StoreError> {
        FormRepo::list(&self.pool).await.map_err(classify)
    }

    async fn update_form(&self, form: &RegistrationForm) -> Result<bool, StoreError> {
        FormRepo::update(&self.pool, form).await.map_err(classify)
    }

    async fn delete_form(&self, id: &str) -> Result<bool, StoreError> {
        FormRepo::delete(&self.pool, id).await.map_err(classify)
    }

    async fn insert_signature(&self, signature: &SignatureRecord) -> Result<(), StoreError> {
        SignatureRepo::create(&self.pool, signature)
            .await
            .map_err(classify)
    }

    async fn list_signatures(&self) -> Result<Vec<SignatureRecord>, StoreError> {
        SignatureRepo::list(&self.pool).await.map_err(classify)
    }

    async fn delete_signatures_for(
        &self,
        student_id: &str,
        locker_id: &str,
    ) -> Result<u64, StoreError> {
        SignatureRepo::delete_for_student_locker(&self.pool, student_id, locker_id)
            .await
            .map_err(classify)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}
