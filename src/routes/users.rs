//! Users resource routes.

use crate::handlers::{create, list};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list).post(create))
        .with_state(state)
}
