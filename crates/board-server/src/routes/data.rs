use axum::extract::State;
use axum::Json;
use board_core::document::{Document, DocumentPatch};
use board_core::error::BoardError;
use board_core::profile::Profile;

use crate::error::AppError;
use crate::state::AppState;

/// GET /data — the whole stored document.
pub async fn get_data(State(app): State<AppState>) -> Result<Json<Document>, AppError> {
    let storage = app.storage();
    let doc = tokio::task::spawn_blocking(move || storage.load_data())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(doc))
}

/// POST /data — shallow-merge a partial document and return the merged
/// result. Each present top-level key replaces the stored value wholesale.
pub async fn post_data(
    State(app): State<AppState>,
    Json(patch): Json<DocumentPatch>,
) -> Result<Json<Document>, AppError> {
    let storage = app.storage();
    let merged = tokio::task::spawn_blocking(move || {
        if let Some(profiles) = &patch.profiles {
            check_unique_emails(profiles, &storage.load_data().profiles)?;
        }
        Ok::<_, BoardError>(storage.save_data(patch))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(merged))
}

/// Reject an incoming profile whose email is owned by a different profile id,
/// either elsewhere in the same payload or in the stored set. Empty emails
/// are exempt.
pub(crate) fn check_unique_emails(incoming: &[Profile], stored: &[Profile]) -> Result<(), BoardError> {
    for (i, p) in incoming.iter().enumerate() {
        if p.email.is_empty() {
            continue;
        }
        let taken = incoming[..i]
            .iter()
            .chain(stored)
            .any(|q| q.email == p.email && q.id != p.id);
        if taken {
            return Err(BoardError::EmailExists(p.email.clone()));
        }
    }
    Ok(())
}
