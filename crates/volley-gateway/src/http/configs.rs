//! Saved-config CRUD — /api/configs.
//!
//! Every route is owner-scoped: list returns only the caller's rows, get
//! and delete 403 on someone else's record, and save is restricted to the
//! configured owner account.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use volley_storage::{BroadcastConfig, NewBroadcastConfig};

use crate::app::AppState;
use crate::auth::{is_owner, Identity};

type ApiError = (StatusCode, Json<Value>);

fn internal(e: impl std::fmt::Display) -> ApiError {
    warn!(error = %e, "config storage error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "internal error" })),
    )
}

/// GET /api/configs — the caller's configs, newest first.
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<BroadcastConfig>>, ApiError> {
    let configs = state.store.list(&identity.email).map_err(internal)?;
    Ok(Json(configs))
}

/// GET /api/configs/{id}.
pub async fn get_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<BroadcastConfig>, ApiError> {
    let config = state
        .store
        .get(id)
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))))?;

    if config.owner_email != identity.email {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Forbidden" })),
        ));
    }
    Ok(Json(config))
}

/// POST /api/configs — owner only.
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(new): Json<NewBroadcastConfig>,
) -> Result<Json<BroadcastConfig>, ApiError> {
    if !is_owner(&state, &identity) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Owner access required" })),
        ));
    }

    let saved = state.store.save(&identity.email, new).map_err(internal)?;
    Ok(Json(saved))
}

/// DELETE /api/configs/{id} — 204 whether or not the row existed, but only
/// the record's owner can actually remove it.
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if let Some(config) = state.store.get(id).map_err(internal)? {
        if config.owner_email == identity.email {
            match state.store.delete(id) {
                Ok(()) | Err(volley_storage::StorageError::NotFound { .. }) => {}
                Err(e) => return Err(internal(e)),
            }
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
