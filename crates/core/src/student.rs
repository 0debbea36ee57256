//! Registration responses and the student projection derived from them.
//!
//! Students are not stored on their own: a [`Student`] is projected from
//! the canonical `student_data` embedded in a [`Response`], and the
//! response id doubles as the student id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::Store;
use crate::types::{DocId, Timestamp};

/// Submitted keys accepted for each canonical student field, in priority order.
const NAME_KEYS: &[&str] = &["name", "fullName", "studentName", "student"];
const SCHOOL_NUMBER_KEYS: &[&str] = &["schoolNumber", "studentId", "schoolNo"];
const CLASS_KEYS: &[&str] = &["class", "className", "grade"];
const CONTACT_KEYS: &[&str] = &["contactNumber", "contact", "phone", "mobile"];

/// Canonical student fields embedded in every response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentData {
    pub name: String,
    pub school_number: String,
    pub class: String,
    pub contact_number: String,
}

impl StudentData {
    /// Map a raw submission onto the canonical shape, accepting the field
    /// id aliases the form builder has produced over time.
    pub fn from_submission(values: &BTreeMap<String, String>) -> Self {
        Self {
            name: first_present(values, NAME_KEYS),
            school_number: first_present(values, SCHOOL_NUMBER_KEYS),
            class: first_present(values, CLASS_KEYS),
            contact_number: first_present(values, CONTACT_KEYS),
        }
    }
}

fn first_present(values: &BTreeMap<String, String>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| values.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// A submitted registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Response {
    pub id: DocId,
    pub form_id: DocId,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub student_data: StudentData,
    /// The submission exactly as received, keyed by form field id.
    pub raw_data: serde_json::Value,
    pub submitted_at: Timestamp,
}

/// Student view projected from a [`Response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// The id of the response this student was projected from.
    pub id: DocId,
    pub name: String,
    pub school_number: String,
    pub class: String,
    pub contact_number: String,
    pub registered_at: Timestamp,
}

impl Student {
    pub fn from_response(response: &Response) -> Self {
        let data = &response.student_data;
        Self {
            id: response.id.clone(),
            name: data.name.clone(),
            school_number: data.school_number.clone(),
            class: data.class.clone(),
            contact_number: data.contact_number.clone(),
            registered_at: response.submitted_at,
        }
    }

    /// Case-insensitive substring match on name, school number, or class.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.name, &self.school_number, &self.class]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Filter responses by a search term (empty term keeps everything).
pub fn search_responses<'a>(responses: &'a [Response], term: &str) -> Vec<&'a Response> {
    responses
        .iter()
        .filter(|r| Student::from_response(r).matches(term))
        .collect()
}

/// Resolve a student by response id. `Ok(None)` when no such response exists.
pub async fn find(store: &dyn Store, id: &str) -> Result<Option<Student>, CoreError> {
    Ok(store
        .get_response(id)
        .await?
        .map(|response| Student::from_response(&response)))
}

/// All students matching `term`, newest registration first.
pub async fn search(store: &dyn Store, term: &str) -> Result<Vec<Student>, CoreError> {
    let responses = store.list_responses().await?;
    Ok(responses
        .iter()
        .map(Student::from_response)
        .filter(|s| s.matches(term))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
