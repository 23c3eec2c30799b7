//! Contact routes.  All of them act on behalf of the calling member.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;

use natter_pipeline::ops::contacts::{add_contact, remove_contact, ContactOutcome};
use natter_pipeline::Params;
use natter_store::ContactEntry;

use crate::auth::caller_id;
use crate::error::ApiError;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list).post(add))
        .route("/contacts/incoming", get(incoming))
        .route("/contacts/{member_id}", delete(remove))
}

/// The caller's outgoing contact rows, joined with member profiles.
async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ContactEntry>>, ApiError> {
    let caller = caller_id(&headers)?;
    Ok(Json(state.store.contacts_of(caller).await?))
}

/// Rows directed at the caller: pending requests plus confirmed pairs.
async fn incoming(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ContactEntry>>, ApiError> {
    let caller = caller_id(&headers)?;
    Ok(Json(state.store.contacts_toward(caller).await?))
}

#[derive(Deserialize)]
struct AddContactRequest {
    member_id: Option<i64>,
    #[serde(default)]
    confirm: bool,
}

async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AddContactRequest>,
) -> Result<(StatusCode, Json<ContactOutcome>), ApiError> {
    let caller = caller_id(&headers)?;
    let outcome = add_contact(
        &state.store,
        Params {
            caller: Some(caller),
            member_id: body.member_id.map(|id| id.to_string()),
            confirm: Some(body.confirm),
            ..Params::default()
        },
    )
    .await?;

    let status = if outcome.verified {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(outcome)))
}

async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let caller = caller_id(&headers)?;
    let removed = remove_contact(
        &state.store,
        Params {
            caller: Some(caller),
            member_id: Some(member_id),
            ..Params::default()
        },
    )
    .await?;

    Ok(Json(serde_json::json!({ "removed": removed })))
}
