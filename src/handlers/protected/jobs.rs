use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::ListQuery;
use crate::database::models::require_object;
use crate::database::store::{DeleteAck, InsertAck, UpdateAck};
use crate::database::{Listing, Lookup};
use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

/// GET /jobs?email=&id= - jobs posted by `email`, the job with `id`, or every job
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Listing>, ApiError> {
    let lookup = Lookup::resolve(query.email, query.id);
    tracing::debug!(caller = ?auth_user.email(), ?lookup, "Listing jobs");

    Ok(Json(state.jobs().list(lookup).await?))
}

/// POST /jobs - insert the posted job as-is
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<InsertAck>, ApiError> {
    let body = require_object(payload)?;
    let ack = state.jobs().create(body).await?;

    tracing::info!(caller = ?auth_user.email(), "Created job {}", ack.inserted_id);
    Ok(Json(ack))
}

/// DELETE /jobs?id= - remove at most one job
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = query.id.unwrap_or_default();
    let ack = state.jobs().delete(&id).await?;

    tracing::info!(caller = ?auth_user.email(), "Deleted job {} ({} removed)", id, ack.deleted_count);
    Ok(Json(ack))
}

/// PUT /jobs/:id - overwrite the job's fixed field set
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<UpdateAck>, ApiError> {
    let body = require_object(payload)?;
    let ack = state.jobs().update(&id, body).await?;

    tracing::info!(
        caller = ?auth_user.email(),
        "Updated job {} (matched {}, modified {})",
        id,
        ack.matched_count,
        ack.modified_count
    );
    Ok(Json(ack))
}
