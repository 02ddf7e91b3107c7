use axum::{Extension, Json, extract::State};
use serde_json::Value;

use seams_types::api::{CreateDmRequest, CreateDmResponse, DmMessagesQuery, DmQuery, DmRequest, DmsResponse};
use seams_types::models::{DmDetails, MessagePage};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::AuthUser;
use crate::{commit, empty, query};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<CreateDmRequest>,
) -> Result<Json<CreateDmResponse>, ApiError> {
    let dm_id = commit(&state, move |s| s.dm_create(auth.user_id, &req.u_ids)).await?;
    Ok(Json(CreateDmResponse { dm_id }))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DmsResponse>, ApiError> {
    let dms = query(&state, move |s| Ok(s.dm_list(auth.user_id))).await?;
    Ok(Json(DmsResponse { dms }))
}

pub async fn details(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(params): QueryParams<DmQuery>,
) -> Result<Json<DmDetails>, ApiError> {
    let details = query(&state, move |s| s.dm_details(auth.user_id, params.dm_id)).await?;
    Ok(Json(details))
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(params): QueryParams<DmMessagesQuery>,
) -> Result<Json<MessagePage>, ApiError> {
    let page = query(&state, move |s| {
        s.dm_messages(auth.user_id, params.dm_id, params.start)
    })
    .await?;
    Ok(Json(page))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<DmRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.dm_leave(auth.user_id, req.dm_id)).await?;
    Ok(empty())
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<DmRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.dm_remove(auth.user_id, req.dm_id)).await?;
    Ok(empty())
}
