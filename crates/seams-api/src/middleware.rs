use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use seams_types::api::Claims;
use seams_types::models::UserId;

use crate::auth::{AppState, decode_token};
use crate::error::ApiError;
use crate::query;

/// The authenticated caller, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub claims: Claims,
}

/// Extract the bearer token, verify it, and check its session is still live.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(ApiError::invalid_token)?;

    let claims = decode_token(&state.jwt_secret, token)?;
    let user_id = {
        let claims = claims.clone();
        query(&state, move |s| s.authenticate(&claims)).await?
    };

    req.extensions_mut().insert(AuthUser { user_id, claims });
    Ok(next.run(req).await)
}
