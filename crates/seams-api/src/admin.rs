use axum::{Extension, Json, extract::State};
use serde_json::Value;

use seams_types::api::{PermissionChangeRequest, RemoveUserRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::{commit, empty};

pub async fn remove_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<RemoveUserRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.remove_user(auth.user_id, req.u_id)).await?;
    Ok(empty())
}

pub async fn change_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<PermissionChangeRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| {
        s.change_permission(auth.user_id, req.u_id, req.permission_id)
    })
    .await?;
    Ok(empty())
}
