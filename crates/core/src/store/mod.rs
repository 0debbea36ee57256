//! Repository contract consumed by the domain operations.
//!
//! The core never talks to a database directly; it issues point reads,
//! conditional writes, and full-collection reads through [`Store`]. Each
//! method corresponds to a single round-trip against the backing store and
//! must be awaited before any in-memory state is updated.

#[cfg(any(test, feature = "test-util"))]
pub mod faulty;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assignment::{Assignment, SignatureAttachment};
use crate::error::StoreError;
use crate::form::RegistrationForm;
use crate::locker::Locker;
use crate::signature::record::SignatureRecord;
use crate::student::Response;
use crate::types::Timestamp;

/// Named document collections. Change notifications are keyed by these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Lockers,
    Assignments,
    Responses,
    Forms,
    Signatures,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Self::Lockers,
        Self::Assignments,
        Self::Responses,
        Self::Forms,
        Self::Signatures,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lockers => "lockers",
            Self::Assignments => "assignments",
            Self::Responses => "responses",
            Self::Forms => "forms",
            Self::Signatures => "signatures",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage backend for lockers, assignments, registrations, and signatures.
///
/// Implementations: [`memory::MemoryStore`] (in-process) and
/// `locker_db::PgStore` (PostgreSQL).
#[async_trait]
pub trait Store: Send + Sync {
    // -----------------------------------------------------------------------
    // Lockers
    // -----------------------------------------------------------------------

    async fn get_locker(&self, id: &str) -> Result<Option<Locker>, StoreError>;

    /// Every locker, sorted by numeric locker number.
    async fn list_lockers(&self) -> Result<Vec<Locker>, StoreError>;

    /// Create `locker` unless a document with its id exists. Returns `true`
    /// when the locker was written.
    async fn insert_locker_if_absent(&self, locker: &Locker) -> Result<bool, StoreError>;

    /// Delete the locker only while it is unoccupied. Returns `true` when a
    /// row was removed.
    async fn delete_locker_if_vacant(&self, id: &str) -> Result<bool, StoreError>;

    /// Compare-and-swap `is_occupied` from `false` to `true`, recording the
    /// student and timestamp. Returns `None` when the locker is missing or
    /// already occupied.
    async fn occupy_locker(
        &self,
        id: &str,
        student_id: &str,
        at: Timestamp,
    ) -> Result<Option<Locker>, StoreError>;

    /// Reset occupancy fields (`is_occupied = false`, student and timestamp
    /// cleared). Returns `None` when the locker is missing.
    async fn vacate_locker(&self, id: &str) -> Result<Option<Locker>, StoreError>;

    /// Set the broken flag and remarks. Occupancy is untouched.
    async fn set_broken(
        &self,
        id: &str,
        is_broken: bool,
        remarks: Option<&str>,
    ) -> Result<Option<Locker>, StoreError>;

    // -----------------------------------------------------------------------
    // Assignments
    // -----------------------------------------------------------------------

    /// Insert a new assignment. Fails with [`StoreError::Conflict`] if the
    /// locker already has one.
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StoreError>;

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError>;

    async fn find_assignment_by_locker(
        &self,
        locker_id: &str,
    ) -> Result<Option<Assignment>, StoreError>;

    async fn list_assignments(&self) -> Result<Vec<Assignment>, StoreError>;

    async fn delete_assignment(&self, id: &str) -> Result<bool, StoreError>;

    async fn attach_signature(
        &self,
        assignment_id: &str,
        attachment: &SignatureAttachment,
    ) -> Result<Option<Assignment>, StoreError>;

    // -----------------------------------------------------------------------
    // Registration responses
    // -----------------------------------------------------------------------

    async fn insert_response(&self, response: &Response) -> Result<(), StoreError>;

    async fn get_response(&self, id: &str) -> Result<Option<Response>, StoreError>;

    /// Every response, newest submission first.
    async fn list_responses(&self) -> Result<Vec<Response>, StoreError>;

    /// Delete the given responses, returning how many existed.
    async fn delete_responses(&self, ids: &[String]) -> Result<u64, StoreError>;

    // -----------------------------------------------------------------------
    // Registration forms
    // -----------------------------------------------------------------------

    async fn insert_form(&self, form: &RegistrationForm) -> Result<(), StoreError>;

    async fn get_form(&self, id: &str) -> Result<Option<RegistrationForm>, StoreError>;

    /// Every form, newest first.
    async fn list_forms(&self) -> Result<Vec<RegistrationForm>, StoreError>;

    /// Overwrite the mutable fields (title, description, active flag, fields).
    async fn update_form(&self, form: &RegistrationForm) -> Result<bool, StoreError>;

    async fn delete_form(&self, id: &str) -> Result<bool, StoreError>;

    // -----------------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------------

    async fn insert_signature(&self, signature: &SignatureRecord) -> Result<(), StoreError>;

    /// Every signature record, newest first.
    async fn list_signatures(&self) -> Result<Vec<SignatureRecord>, StoreError>;

    /// Delete signature records keyed by `(student_id, locker_id)`.
    async fn delete_signatures_for(
        &self,
        student_id: &str,
        locker_id: &str,
    ) -> Result<u64, StoreError>;

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// The full current contents of one collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "collection", content = "documents", rename_all = "lowercase")]
pub enum Snapshot {
    Lockers(Vec<Locker>),
    Assignments(Vec<Assignment>),
    Responses(Vec<Response>),
    Forms(Vec<RegistrationForm>),
    Signatures(Vec<SignatureRecord>),
}

impl Snapshot {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Lockers(_) => Collection::Lockers,
            Self::Assignments(_) => Collection::Assignments,
            Self::Responses(_) => Collection::Responses,
            Self::Forms(_) => Collection::Forms,
            Self::Signatures(_) => Collection::Signatures,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Lockers(d) => d.len(),
            Self::Assignments(d) => d.len(),
            Self::Responses(d) => d.len(),
            Self::Forms(d) => d.len(),
            Self::Signatures(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read the full current contents of `collection`.
pub async fn load_snapshot(
    store: &dyn Store,
    collection: Collection,
) -> Result<Snapshot, StoreError> {
    Ok(match collection {
        Collection::Lockers => Snapshot::Lockers(store.list_lockers().await?),
        Collection::Assignments => Snapshot::Assignments(store.list_assignments().await?),
        Collection::Responses => Snapshot::Responses(store.list_responses().await?),
        Collection::Forms => Snapshot::Forms(store.list_forms().await?),
        Collection::Signatures => Snapshot::Signatures(store.list_signatures().await?),
    })
}
