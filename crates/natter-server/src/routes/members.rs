//! Member directory routes: listing, search, and single profiles.
//!
//! These are plain reads with no relationship preconditions, so they go
//! straight to the store rather than through a pipeline.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};

use natter_store::Member;

use crate::auth::caller_id;
use crate::error::ApiError;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(directory))
        .route("/members/search/{query}", get(search))
        .route("/members/{member_id}", get(profile))
}

/// Everyone except the caller.
async fn directory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Member>>, ApiError> {
    let caller = caller_id(&headers)?;
    Ok(Json(state.store.list_members_except(caller).await?))
}

/// Case-insensitive substring search over names, username, and email.
async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("search query is required".into()));
    }

    Ok(Json(state.store.search_members(query).await?))
}

async fn profile(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<Member>, ApiError> {
    let id: i64 = member_id
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("member id must be a number".into()))?;

    let member = state
        .store
        .get_member(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("member {id} not found")))?;

    Ok(Json(member))
}
