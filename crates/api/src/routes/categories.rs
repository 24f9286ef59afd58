//! Category queries against the read model.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use event_store::EventStore;
use projections::CategoryRow;

use super::AppState;
use crate::error::ApiError;

/// GET /categories: lists all categories, including deleted ones.
pub async fn list<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<Vec<CategoryRow>> {
    Json(state.categories.get_all_categories().await)
}

/// GET /categories/{id}: gets one category.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CategoryRow>, ApiError> {
    let category_id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid category ID: {id}")))?;

    state
        .categories
        .get_category(category_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Category {id} not found")))
}
