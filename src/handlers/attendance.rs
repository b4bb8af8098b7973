use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use super::path_param;
use crate::auth::AuthUser;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::empty_success;

pub async fn attend_event(
    user: AuthUser,
    event_id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let event_id = path_param(event_id)?;
    if state.events.attend_event(user.id(), event_id).await? {
        Ok(empty_success("You are now attending this event"))
    } else {
        Err(AppError::ValidationError(
            "Already attending or event not found".into(),
        ))
    }
}

pub async fn unattend_event(
    user: AuthUser,
    event_id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let event_id = path_param(event_id)?;
    if state.events.unattend_event(user.id(), event_id).await? {
        Ok(empty_success("You are no longer attending this event"))
    } else {
        Err(AppError::ValidationError(
            "You are not attending this event".into(),
        ))
    }
}
