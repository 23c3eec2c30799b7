//! The demo notes resource: the worked CRUD example, kept as small as the
//! handler shape allows.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use natter_store::DemoNote;

use crate::error::ApiError;
use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/demo", get(list).post(create).put(update))
        .route("/demo/{name}", get(single).delete(remove))
}

#[derive(Deserialize)]
struct NoteRequest {
    name: Option<String>,
    message: Option<String>,
}

impl NoteRequest {
    /// Both fields are required and non-blank.
    fn into_fields(self) -> Result<(String, String), ApiError> {
        match (trimmed(self.name), trimmed(self.message)) {
            (Some(name), Some(message)) => Ok((name, message)),
            _ => Err(ApiError::BadRequest(
                "name and message are required".into(),
            )),
        }
    }
}

fn trimmed(field: Option<String>) -> Option<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<NoteRequest>,
) -> Result<(StatusCode, Json<DemoNote>), ApiError> {
    let (name, message) = body.into_fields()?;

    match state.store.insert_note(&name, &message).await {
        Ok(note) => Ok((StatusCode::CREATED, Json(note))),
        Err(err) if err.is_unique_violation() => {
            Err(ApiError::Conflict(format!("note '{name}' already exists")))
        }
        Err(err) => Err(err.into()),
    }
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<DemoNote>>, ApiError> {
    Ok(Json(state.store.list_notes().await?))
}

async fn single(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DemoNote>, ApiError> {
    let note = state
        .store
        .get_note(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("note '{name}' not found")))?;

    Ok(Json(note))
}

async fn update(
    State(state): State<AppState>,
    Json(body): Json<NoteRequest>,
) -> Result<Json<DemoNote>, ApiError> {
    let (name, message) = body.into_fields()?;

    if !state.store.update_note(&name, &message).await? {
        return Err(ApiError::NotFound(format!("note '{name}' not found")));
    }

    Ok(Json(DemoNote { name, message }))
}

async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.store.delete_note(&name).await? {
        return Err(ApiError::NotFound(format!("note '{name}' not found")));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
