//! User queries against the read model.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use event_store::EventStore;
use projections::UserRow;
use uuid::Uuid;

use super::AppState;
use crate::error::ApiError;

/// GET /users: lists all users.
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<UserRow>> {
    Json(state.users.get_all_users().await)
}

/// GET /users/{id}: gets one user.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<UserRow>, ApiError> {
    let user_id: Uuid = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user ID: {id}")))?;

    state
        .users
        .get_user(user_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))
}
