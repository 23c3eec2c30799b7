//! Chat and membership routes.
//!
//! Handlers keep identifier path segments as raw strings; the pipeline's
//! shape guard owns parsing and rejection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use natter_pipeline::ops::chats::{
    chat_roster, chats_for_member, create_chat, join_chat, leave_chat, JoinOutcome, LeaveOutcome,
};
use natter_pipeline::Params;
use natter_store::{Chat, ChatSummary, Member};

use crate::error::ApiError;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chats", post(create))
        .route("/chats/{chat_id}/members", put(add_members).get(roster))
        .route("/chats/{chat_id}/members/{email}", delete(remove_member))
        .route("/chats/member/{member_id}", get(member_chats))
}

#[derive(Deserialize)]
struct CreateChatRequest {
    name: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<Chat>), ApiError> {
    let chat = create_chat(
        &state.store,
        Params {
            name: body.name,
            ..Params::default()
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

#[derive(Deserialize)]
struct AddMembersRequest {
    member_ids: Option<Vec<i64>>,
}

async fn add_members(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(body): Json<AddMembersRequest>,
) -> Result<Json<JoinOutcome>, ApiError> {
    let outcome = join_chat(
        &state.store,
        Params {
            chat_id: Some(chat_id),
            member_ids: body.member_ids,
            ..Params::default()
        },
    )
    .await?;

    Ok(Json(outcome))
}

async fn roster(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<Member>>, ApiError> {
    let members = chat_roster(
        &state.store,
        Params {
            chat_id: Some(chat_id),
            ..Params::default()
        },
    )
    .await?;

    Ok(Json(members))
}

async fn remove_member(
    State(state): State<AppState>,
    Path((chat_id, email)): Path<(String, String)>,
) -> Result<Json<LeaveOutcome>, ApiError> {
    let outcome = leave_chat(
        &state.store,
        Params {
            chat_id: Some(chat_id),
            email: Some(email),
            ..Params::default()
        },
    )
    .await?;

    Ok(Json(outcome))
}

async fn member_chats(
    State(state): State<AppState>,
    Path(member_id): Path<String>,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let chats = chats_for_member(
        &state.store,
        Params {
            member_id: Some(member_id),
            ..Params::default()
        },
    )
    .await?;

    Ok(Json(chats))
}
