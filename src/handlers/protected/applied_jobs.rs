use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::Value;

use super::ListQuery;
use crate::database::models::require_object;
use crate::database::store::InsertAck;
use crate::database::{Listing, Lookup};
use crate::error::ApiError;
use crate::middleware::{AuthUser, JsonBody};
use crate::state::AppState;

/// GET /appliedjobs?email=&id= - same filter precedence as GET /jobs
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Listing>, ApiError> {
    let lookup = Lookup::resolve(query.email, query.id);
    tracing::debug!(caller = ?auth_user.email(), ?lookup, "Listing applications");

    Ok(Json(state.applied_jobs().list(lookup).await?))
}

/// POST /appliedjobs/:id - record an application and bump the job's applicant count
pub async fn apply(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<Value>,
) -> Result<Json<InsertAck>, ApiError> {
    let application = require_object(payload)?;
    let ack = state.applied_jobs().apply(&job_id, application).await?;

    tracing::info!(
        caller = ?auth_user.email(),
        "Application {} submitted for job {}",
        ack.inserted_id,
        job_id
    );
    Ok(Json(ack))
}
