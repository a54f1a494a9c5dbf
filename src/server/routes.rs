use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::task;

use super::{error::ApiError, extract::NoteBody, AppState};
use crate::entity::Note;
use crate::error::Result;
use crate::service::NoteService;

/// `{"message": ...}` confirmation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Run a store-bound service call on the blocking pool.
async fn blocking<T, F>(notes: &NoteService, op: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce(&NoteService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let notes = notes.clone();
    let outcome = task::spawn_blocking(move || op(&notes))
        .await
        .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?;
    Ok(outcome?)
}

pub async fn root_handler() -> Json<Message> {
    Message::new("Notes API is running")
}

pub async fn create_note_handler(
    State(state): State<AppState>,
    NoteBody(input): NoteBody,
) -> std::result::Result<Json<Note>, ApiError> {
    let note = blocking(&state.notes, move |notes| notes.create(&input)).await?;
    Ok(Json(note))
}

pub async fn list_notes_handler(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<Note>>, ApiError> {
    let notes = blocking(&state.notes, |notes| {
        notes.list()?.collect::<Result<Vec<Note>>>()
    })
    .await?;
    Ok(Json(notes))
}

pub async fn get_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<Note>, ApiError> {
    let note = blocking(&state.notes, move |notes| notes.get(&id)).await?;
    Ok(Json(note))
}

pub async fn update_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    NoteBody(input): NoteBody,
) -> std::result::Result<Json<Note>, ApiError> {
    let note = blocking(&state.notes, move |notes| notes.update(&id, &input)).await?;
    Ok(Json(note))
}

pub async fn delete_note_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<Message>, ApiError> {
    blocking(&state.notes, move |notes| notes.delete(&id)).await?;
    Ok(Message::new("Note deleted"))
}

pub async fn get_shared_note_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> std::result::Result<Json<Note>, ApiError> {
    let note = blocking(&state.notes, move |notes| notes.get_shared(&share_id)).await?;
    Ok(Json(note))
}

pub async fn delete_shared_note_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> std::result::Result<Json<Message>, ApiError> {
    blocking(&state.notes, move |notes| notes.delete_shared(&share_id)).await?;
    Ok(Message::new("Shared note deleted"))
}
