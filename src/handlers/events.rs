use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use super::{json_body, path_param, query_params};
use crate::auth::AuthUser;
use crate::models::{EventRequest, MonthQuery};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, no_content, success};

pub async fn get_my_events(user: AuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let events = state.events.list_by_owner(user.id()).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> AppResult<Response> {
    let request = json_body(body)?;
    let event = state.events.create_event(user.id(), request).await?;

    let location = HeaderValue::from_str(&format!("/api/events/{}", event.id))
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    let mut response = created(event, "Event created");
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

pub async fn get_event(
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let id = path_param(id)?;
    match state.events.get_event(id).await? {
        Some(event) => Ok(success(event, "Event retrieved")),
        None => Err(AppError::NotFound(format!("Event '{}' was not found", id))),
    }
}

pub async fn update_event(
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> AppResult<Response> {
    let id = path_param(id)?;
    let request = json_body(body)?;
    let event = state.events.update_event(id, user.id(), request).await?;
    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let id = path_param(id)?;
    if state.events.delete_event(id, user.id()).await? {
        Ok(no_content())
    } else {
        Err(AppError::Forbidden(
            "You can only delete your own events".into(),
        ))
    }
}

pub async fn get_events_by_month(
    query: Result<Query<MonthQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let query = query_params(query)?;
    let events = state.events.list_by_month(query.year, query.month).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn get_attending_event_ids(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let ids = state.events.attending_event_ids(user.id()).await?;
    Ok(success(ids, "Attending event ids retrieved"))
}

pub async fn get_my_attending_events(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let events = state.events.list_attending(user.id()).await?;
    Ok(success(events, "Attending events retrieved"))
}
