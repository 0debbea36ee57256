//! Public registration endpoints. No authentication.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use locker_core::error::CoreError;
use locker_core::form;
use locker_core::store::Collection;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Flatten a JSON submission to the string map forms validate against.
///
/// Numbers and booleans keep their JSON spelling, `null` becomes empty.
/// Nested values are rejected.
fn flatten_submission(input: BTreeMap<String, Value>) -> Result<BTreeMap<String, String>, AppError> {
    input
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::BadRequest(format!(
                        "Field '{key}' must be a single value"
                    )))
                }
            };
            Ok((key, text))
        })
        .collect()
}

/// GET /api/v1/register/{form_id}
///
/// Inactive forms are reported as missing.
pub async fn get_public_form(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let found = form::get(state.store.as_ref(), &form_id).await?;
    if !found.is_active {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }));
    }
    Ok(Json(DataResponse { data: found }))
}

/// POST /api/v1/register/{form_id}
pub async fn submit_registration(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(input): Json<BTreeMap<String, Value>>,
) -> AppResult<impl IntoResponse> {
    let values = flatten_submission(input)?;
    let response = form::submit(state.store.as_ref(), &form_id, values, chrono::Utc::now()).await?;
    state.notify(Collection::Responses, Some(&response.id), None);
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn scalars_are_stringified() {
        let input: BTreeMap<String, Value> = serde_json::from_value(json!({
            "name": "Tan Wei",
            "age": 15,
            "consent": true,
            "notes": null,
        }))
        .unwrap();

        let flat = flatten_submission(input).unwrap();
        assert_eq!(flat["name"], "Tan Wei");
        assert_eq!(flat["age"], "15");
        assert_eq!(flat["consent"], "true");
        assert_eq!(flat["notes"], "");
    }

    #[test]
    fn nested_values_are_rejected() {
        let input: BTreeMap<String, Value> =
            serde_json::from_value(json!({ "name": ["a", "b"] })).unwrap();
        assert_matches!(flatten_submission(input), Err(AppError::BadRequest(_)));
    }
}
