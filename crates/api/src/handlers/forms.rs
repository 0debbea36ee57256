//! Handlers for the registration form builder.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use locker_core::form::{self, CreateForm, RegistrationForm, UpdateForm};
use locker_core::store::Collection;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A form together with its public registration link.
#[derive(Debug, Serialize)]
pub struct FormView {
    #[serde(flatten)]
    pub form: RegistrationForm,
    pub share_link: String,
}

impl FormView {
    fn new(form: RegistrationForm, state: &AppState) -> Self {
        let share_link = form::share_link(&state.config.public_base_url, &form.id);
        Self { form, share_link }
    }
}

/// GET /api/v1/forms
pub async fn list_forms(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let forms: Vec<FormView> = state
        .store
        .list_forms()
        .await?
        .into_iter()
        .map(|f| FormView::new(f, &state))
        .collect();
    Ok(Json(DataResponse { data: forms }))
}

/// POST /api/v1/forms
pub async fn create_form(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateForm>,
) -> AppResult<impl IntoResponse> {
    let created = form::create(
        state.store.as_ref(),
        input,
        &user.principal,
        chrono::Utc::now(),
    )
    .await?;
    state.notify(Collection::Forms, Some(&created.id), Some(user.id()));
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: FormView::new(created, &state),
        }),
    ))
}

/// GET /api/v1/forms/{id}
pub async fn get_form(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let found = form::get(state.store.as_ref(), &form_id).await?;
    Ok(Json(DataResponse {
        data: FormView::new(found, &state),
    }))
}

/// PUT /api/v1/forms/{id}
pub async fn update_form(
    user: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(input): Json<UpdateForm>,
) -> AppResult<impl IntoResponse> {
    let updated = form::update(state.store.as_ref(), &form_id, input).await?;
    state.notify(Collection::Forms, Some(&form_id), Some(user.id()));
    Ok(Json(DataResponse {
        data: FormView::new(updated, &state),
    }))
}

/// DELETE /api/v1/forms/{id}
pub async fn delete_form(
    user: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    form::delete(state.store.as_ref(), &form_id).await?;
    state.notify(Collection::Forms, Some(&form_id), Some(user.id()));
    Ok(StatusCode::NO_CONTENT)
}
