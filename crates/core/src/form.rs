//! Registration form schema: typed field kinds, form definitions, and
//! submission validation.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::error::CoreError;
use crate::store::Store;
use crate::student::{Response, StudentData};
use crate::types::{DocId, Principal, Timestamp};

/// Id that always resolves to the built-in form.
pub const DEFAULT_FORM_ID: &str = "default";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9()\-\s]{5,19}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

/// The input kind of a form field. Serialized as `"type": "<kind>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Email,
    #[serde(rename = "tel")]
    Phone,
    Select { options: Vec<String> },
}

impl FieldKind {
    /// Check a non-empty submitted value against this kind.
    pub fn validate(&self, value: &str) -> Result<(), String> {
        match self {
            Self::Text => Ok(()),
            Self::Number => value
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| "must be a number".to_string()),
            Self::Email => value
                .validate_email()
                .then_some(())
                .ok_or_else(|| "must be a valid email address".to_string()),
            Self::Phone => PHONE_RE
                .is_match(value)
                .then_some(())
                .ok_or_else(|| "must be a valid phone number".to_string()),
            Self::Select { options } => options
                .iter()
                .any(|o| o == value)
                .then_some(())
                .ok_or_else(|| format!("must be one of: {}", options.join(", "))),
        }
    }
}

/// One input on a registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    fn new(id: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            required: true,
        }
    }
}

/// Fields of the built-in registration form.
pub fn default_fields() -> Vec<FormField> {
    vec![
        FormField::new("name", "Student Name", FieldKind::Text),
        FormField::new("schoolNumber", "School Number", FieldKind::Text),
        FormField::new("class", "Class", FieldKind::Text),
        FormField::new("contactNumber", "Contact Number", FieldKind::Phone),
    ]
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RegistrationForm {
    pub id: DocId,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub fields: Vec<FormField>,
    pub created_at: Timestamp,
    pub created_by: Option<DocId>,
}

impl RegistrationForm {
    /// The built-in form served for [`DEFAULT_FORM_ID`].
    pub fn builtin() -> Self {
        Self {
            id: DEFAULT_FORM_ID.to_string(),
            title: "Student Locker Registration".to_string(),
            description: "Fill out this form to register for a locker".to_string(),
            is_active: true,
            fields: default_fields(),
            created_at: Timestamp::UNIX_EPOCH,
            created_by: None,
        }
    }

    /// Validate a submission against this form.
    ///
    /// Missing required fields are reported together, by label, before any
    /// per-kind check runs.
    pub fn validate_submission(&self, values: &BTreeMap<String, String>) -> Result<(), CoreError> {
        if !self.is_active {
            return Err(CoreError::Validation(
                "Form not found or is no longer available".into(),
            ));
        }

        let value_of = |field: &FormField| {
            values
                .get(&field.id)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required && value_of(f).is_none())
            .map(|f| f.label.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Please fill in all required fields: {}",
                missing.join(", ")
            )));
        }

        for field in &self.fields {
            if let Some(value) = value_of(field) {
                field
                    .kind
                    .validate(value)
                    .map_err(|msg| CoreError::Validation(format!("{} {msg}", field.label)))?;
            }
        }
        Ok(())
    }
}

/// Public registration URL for a form.
pub fn share_link(public_base_url: &str, form_id: &str) -> String {
    format!("{}/register/{form_id}", public_base_url.trim_end_matches('/'))
}

/// Check the structural rules of a field list.
pub fn validate_fields(fields: &[FormField]) -> Result<(), CoreError> {
    if fields.is_empty() {
        return Err(CoreError::Validation("A form needs at least one field".into()));
    }
    let mut seen = HashSet::new();
    for field in fields {
        if field.id.trim().is_empty() {
            return Err(CoreError::Validation("Field ids must not be empty".into()));
        }
        if !seen.insert(field.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate field id '{}'",
                field.id
            )));
        }
        if field.label.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Field '{}' needs a label",
                field.id
            )));
        }
        if let FieldKind::Select { options } = &field.kind {
            if options.iter().all(|o| o.trim().is_empty()) {
                return Err(CoreError::Validation(format!(
                    "Select field '{}' needs at least one option",
                    field.label
                )));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateForm {
    #[validate(length(min = 1, max = 200, message = "Form title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub is_active: Option<bool>,
    /// Defaults to [`default_fields`] when omitted.
    pub fields: Option<Vec<FormField>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateForm {
    #[validate(length(min = 1, max = 200, message = "Form title is required"))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub fields: Option<Vec<FormField>>,
}

fn check<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

// ---------------------------------------------------------------------------
// Store-backed operations
// ---------------------------------------------------------------------------

pub async fn create(
    store: &dyn Store,
    input: CreateForm,
    principal: &Principal,
    now: Timestamp,
) -> Result<RegistrationForm, CoreError> {
    check(&input)?;
    if input.title.trim().is_empty() {
        return Err(CoreError::Validation("Form title is required".into()));
    }
    let fields = input.fields.unwrap_or_else(default_fields);
    validate_fields(&fields)?;

    let form = RegistrationForm {
        id: uuid::Uuid::new_v4().to_string(),
        title: input.title.trim().to_string(),
        description: input.description,
        is_active: input.is_active.unwrap_or(true),
        fields,
        created_at: now,
        created_by: Some(principal.id.clone()),
    };
    store.insert_form(&form).await?;
    tracing::info!(form_id = %form.id, created_by = %principal.id, "Registration form created");
    Ok(form)
}

/// Fetch a form; [`DEFAULT_FORM_ID`] always resolves to the built-in form.
pub async fn get(store: &dyn Store, id: &str) -> Result<RegistrationForm, CoreError> {
    if id == DEFAULT_FORM_ID {
        return Ok(RegistrationForm::builtin());
    }
    store.get_form(id).await?.ok_or_else(|| CoreError::NotFound {
        entity: "Form",
        id: id.to_string(),
    })
}

pub async fn update(
    store: &dyn Store,
    id: &str,
    input: UpdateForm,
) -> Result<RegistrationForm, CoreError> {
    check(&input)?;
    let mut form = store.get_form(id).await?.ok_or_else(|| CoreError::NotFound {
        entity: "Form",
        id: id.to_string(),
    })?;

    if let Some(title) = input.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("Form title is required".into()));
        }
        form.title = title.to_string();
    }
    if let Some(description) = input.description {
        form.description = description;
    }
    if let Some(is_active) = input.is_active {
        form.is_active = is_active;
    }
    if let Some(fields) = input.fields {
        validate_fields(&fields)?;
        form.fields = fields;
    }

    if !store.update_form(&form).await? {
        return Err(CoreError::NotFound {
            entity: "Form",
            id: id.to_string(),
        });
    }
    tracing::info!(form_id = %id, "Registration form updated");
    Ok(form)
}

pub async fn delete(store: &dyn Store, id: &str) -> Result<(), CoreError> {
    if !store.delete_form(id).await? {
        return Err(CoreError::NotFound {
            entity: "Form",
            id: id.to_string(),
        });
    }
    tracing::info!(form_id = %id, "Registration form deleted");
    Ok(())
}

/// Accept a public registration for `form_id`.
///
/// The raw submission is stored alongside the normalized student data.
pub async fn submit(
    store: &dyn Store,
    form_id: &str,
    values: BTreeMap<String, String>,
    now: Timestamp,
) -> Result<Response, CoreError> {
    let form = get(store, form_id).await?;
    form.validate_submission(&values)?;

    let response = Response {
        id: uuid::Uuid::new_v4().to_string(),
        form_id: form.id.clone(),
        student_data: StudentData::from_submission(&values),
        raw_data: serde_json::to_value(&values)
            .map_err(|e| CoreError::Internal(format!("Failed to encode submission: {e}")))?,
        submitted_at: now,
    };
    store.insert_response(&response).await?;
    tracing::info!(form_id = %form.id, response_id = %response.id, "Registration submitted");
    Ok(response)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
