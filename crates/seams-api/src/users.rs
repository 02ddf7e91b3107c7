use axum::{Extension, Json, extract::State};
use serde_json::Value;

use seams_types::api::{ProfileQuery, ProfileResponse, SetEmailRequest, SetHandleRequest, SetNameRequest, UsersResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::AuthUser;
use crate::{commit, empty, query};

pub async fn all(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = query(&state, move |s| Ok(s.users_all())).await?;
    Ok(Json(UsersResponse { users }))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
    QueryParams(params): QueryParams<ProfileQuery>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = query(&state, move |s| s.user_profile(params.u_id)).await?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn set_name(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<SetNameRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| {
        s.set_name(auth.user_id, &req.name_first, &req.name_last)
    })
    .await?;
    Ok(empty())
}

pub async fn set_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<SetEmailRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.set_email(auth.user_id, &req.email)).await?;
    Ok(empty())
}

pub async fn set_handle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(req): JsonBody<SetHandleRequest>,
) -> Result<Json<Value>, ApiError> {
    commit(&state, move |s| s.set_handle(auth.user_id, &req.handle_str)).await?;
    Ok(empty())
}
