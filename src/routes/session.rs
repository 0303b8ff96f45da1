// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state routes. The state is read whole and changed only by
//! posting commands.

use crate::error::{AppError, Result};
use crate::session::{SessionCommand, SessionState, MAX_SEARCH_CHARS};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/session", get(get_session))
        .route("/api/session/commands", post(dispatch))
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionState> {
    Json(state.session.snapshot())
}

/// Apply one command and return the resulting state.
async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(command): Json<SessionCommand>,
) -> Result<Json<SessionState>> {
    if let SessionCommand::SetSearchText { text } = &command {
        if text.trim().chars().count() > MAX_SEARCH_CHARS {
            return Err(AppError::BadRequest(format!(
                "Search text must be at most {} characters",
                MAX_SEARCH_CHARS
            )));
        }
    }
    Ok(Json(state.session.dispatch(command)))
}
