//! Request dispatch for the `notes` collection.
//!
//! Every request lands in [`dispatch`]; the method and the resource id
//! parsed from the path select the operation.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use service::notes::{NoteDraft, NotePatch, NoteRepository};
use tracing::info;

use crate::errors::ApiError;
use crate::startup::AppState;

pub const COLLECTION: &str = "notes";

/// Resource id from a request path.
///
/// Non-empty segments only. The id is the second segment, verbatim, when the
/// first one is `notes` (any case); otherwise there is none.
pub fn parse_resource_id(path: &str) -> Option<&str> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let first = segments.next()?;
    if !first.eq_ignore_ascii_case(COLLECTION) {
        return None;
    }
    segments.next()
}

/// Catch-all handler implementing the routing table.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Result<Response, ApiError> {
    // preflight: no store access
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let id = parse_resource_id(uri.path());
    let notes = state.notes.as_ref();
    match (method.as_str(), id) {
        ("GET", Some(id)) => get_note(notes, id).await,
        ("GET", None) => list_notes(notes).await,
        ("POST", _) => create_note(notes, &body).await,
        ("PATCH", Some(id)) => update_note(notes, id, &body).await,
        ("PATCH", None) => Err(ApiError::bad_request("ID is required for PATCH method.")),
        ("DELETE", Some(id)) => delete_note(notes, id).await,
        ("DELETE", None) => Err(ApiError::bad_request("ID is required for DELETE method.")),
        _ => Err(ApiError::method_not_allowed()),
    }
}

async fn list_notes(notes: &dyn NoteRepository) -> Result<Response, ApiError> {
    let all = notes.list().await?;
    Ok(Json(all).into_response())
}

async fn get_note(notes: &dyn NoteRepository, id: &str) -> Result<Response, ApiError> {
    let note = notes.get(id).await?;
    Ok(Json(note).into_response())
}

async fn create_note(notes: &dyn NoteRepository, body: &[u8]) -> Result<Response, ApiError> {
    let note = notes.create(NoteDraft::from_body(body)).await?;
    info!(id = %note.id, "note created");
    Ok((StatusCode::CREATED, Json(note)).into_response())
}

async fn update_note(notes: &dyn NoteRepository, id: &str, body: &[u8]) -> Result<Response, ApiError> {
    let patch = NotePatch::from_body(body)?;
    let note = notes.update(id, patch).await?;
    info!(id = %note.id, "note updated");
    Ok(Json(note).into_response())
}

async fn delete_note(notes: &dyn NoteRepository, id: &str) -> Result<Response, ApiError> {
    notes.delete(id).await?;
    info!(id, "note deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}
