use axum::{Extension, Json, extract::State};
use serde_json::Value;

use seams_types::api::{
    ChannelDetailsResponse, ChannelMemberRequest, ChannelMessagesQuery, ChannelQuery, ChannelRequest,
    ChannelsResponse, CreateChannelRequest, CreateChannelResponse,
};
use seams_types::models::MessagePage;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::AuthUser;
use crate::{commit, empty, query};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<CreateChannelRequest>,
) -> Result<Json<CreateChannelResponse>, ApiError> {
    let channel_id = commit(&state, move |s| {
        s.create_channel(auth.user_id, &req.name, req.is_public)
    })
    .await?;

    Ok(Json(CreateChannelResponse { channel_id }))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let channels = query(&state, move |s| Ok(s.channels_list(auth.user_id))).await?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn list_all(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
) -> Result<Json<ChannelsResponse>, ApiError> {
    let channels = query(&state, move |s| Ok(s.channels_list_all())).await?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn details(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(params): QueryParams<ChannelQuery>,
) -> Result<Json<ChannelDetailsResponse>, ApiError> {
    let details = query(&state, move |s| s.channel_details(auth.user_id, params.channel_id)).await?;
    Ok(Json(details))
}

pub async fn join(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<ChannelRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.channel_join(auth.user_id, req.channel_id)).await?;
    Ok(empty())
}

pub async fn invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<ChannelMemberRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| {
        s.channel_invite(auth.user_id, req.channel_id, req.u_id)
    })
    .await?;
    Ok(empty())
}

pub async fn messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    QueryParams(params): QueryParams<ChannelMessagesQuery>,
) -> Result<Json<MessagePage>, ApiError> {
    let page = query(&state, move |s| {
        s.channel_messages(auth.user_id, params.channel_id, params.start)
    })
    .await?;
    Ok(Json(page))
}

pub async fn leave(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<ChannelRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.channel_leave(auth.user_id, req.channel_id)).await?;
    Ok(empty())
}

pub async fn add_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<ChannelMemberRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| {
        s.channel_add_owner(auth.user_id, req.channel_id, req.u_id)
    })
    .await?;
    Ok(empty())
}

pub async fn remove_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<ChannelMemberRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| {
        s.channel_remove_owner(auth.user_id, req.channel_id, req.u_id)
    })
    .await?;
    Ok(empty())
}
