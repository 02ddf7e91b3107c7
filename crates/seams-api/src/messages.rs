use axum::{Extension, Json, extract::State};
use serde_json::Value;

use seams_types::api::{EditMessageRequest, RemoveMessageRequest, SendDmRequest, SendMessageRequest, SendMessageResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::AuthUser;
use crate::{commit, empty};

pub async fn send(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let message_id = commit(&state, move |s| {
        s.message_send(auth.user_id, req.channel_id, &req.message)
    })
    .await?;

    Ok(Json(SendMessageResponse { message_id }))
}

pub async fn send_dm(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<SendDmRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let message_id = commit(&state, move |s| {
        s.message_send_dm(auth.user_id, req.dm_id, &req.message)
    })
    .await?;

    Ok(Json(SendMessageResponse { message_id }))
}

/// An empty `message` removes the message instead of editing it.
pub async fn edit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<EditMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| {
        s.message_edit(auth.user_id, req.message_id, &req.message)
    })
    .await?;
    Ok(empty())
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<RemoveMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.message_remove(auth.user_id, req.message_id)).await?;
    Ok(empty())
}
