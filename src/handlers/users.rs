//! User handlers: list and create.

use crate::error::AppError;
use crate::state::AppState;
use crate::validation::RequestValidator;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.store.list_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let new_user = RequestValidator::new_user(body)?;
    let user = state.store.create_user(&new_user).await?;
    tracing::info!(id = user.id, "user created");
    let location = format!("/users/{}", user.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}
