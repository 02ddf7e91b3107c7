pub mod admin;
pub mod auth;
pub mod channels;
pub mod dms;
pub mod error;
pub mod extract;
pub mod messages;
pub mod middleware;
pub mod users;

use axum::{
    Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use seams_db::{StoreResult, StoreState};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Run blocking work (password hashing, snapshot writes) off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}

/// Run one read-only store operation off the async runtime.
pub(crate) async fn query<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&StoreState) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.clone();
    blocking(move || db.db.read(f).map_err(ApiError::from)).await
}

/// Apply one mutating store operation and commit it.
pub(crate) async fn commit<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut StoreState) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.clone();
    blocking(move || db.db.write(f).map_err(ApiError::from)).await
}

pub(crate) fn empty() -> Json<Value> {
    Json(json!({}))
}

/// Wipe the whole store. Intended for test isolation.
async fn clear(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let db = state.clone();
    blocking(move || db.db.clear().map_err(ApiError::from)).await?;
    Ok(empty())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register/v2", post(auth::register))
        .route("/auth/login/v2", post(auth::login))
        .route("/clear/v1", delete(clear))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/auth/logout/v1", post(auth::logout))
        .route("/channels/create/v2", post(channels::create))
        .route("/channels/list/v2", get(channels::list))
        .route("/channels/listall/v2", get(channels::list_all))
        .route("/channel/details/v2", get(channels::details))
        .route("/channel/join/v2", post(channels::join))
        .route("/channel/invite/v2", post(channels::invite))
        .route("/channel/messages/v2", get(channels::messages))
        .route("/channel/leave/v1", post(channels::leave))
        .route("/channel/addowner/v1", post(channels::add_owner))
        .route("/channel/removeowner/v1", post(channels::remove_owner))
        .route("/dm/create/v1", post(dms::create))
        .route("/dm/list/v1", get(dms::list))
        .route("/dm/remove/v1", delete(dms::remove))
        .route("/dm/details/v1", get(dms::details))
        .route("/dm/leave/v1", post(dms::leave))
        .route("/dm/messages/v1", get(dms::messages))
        .route("/message/send/v1", post(messages::send))
        .route("/message/senddm/v1", post(messages::send_dm))
        .route("/message/edit/v1", put(messages::edit))
        .route("/message/remove/v1", delete(messages::remove))
        .route("/users/all/v1", get(users::all))
        .route("/user/profile/v1", get(users::profile))
        .route("/user/profile/setname/v1", put(users::set_name))
        .route("/user/profile/setemail/v1", put(users::set_email))
        .route("/user/profile/sethandle/v1", put(users::set_handle))
        .route("/admin/user/remove/v1", delete(admin::remove_user))
        .route("/admin/userpermission/change/v1", post(admin::change_permission))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
