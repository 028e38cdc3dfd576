use axum::extract::State;
use axum::Json;
use board_core::mission::Mission;
use board_core::storage::EntityPayload;

use crate::error::AppError;
use crate::state::AppState;

/// GET /missions — the missions collection.
pub async fn list_missions(State(app): State<AppState>) -> Result<Json<Vec<Mission>>, AppError> {
    let storage = app.storage();
    let doc = tokio::task::spawn_blocking(move || storage.load_data())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(doc.missions))
}

/// POST /missions — upsert one mission or an array of missions by id;
/// records without an id get a generated one. Returns the stored collection.
pub async fn post_missions(
    State(app): State<AppState>,
    Json(payload): Json<EntityPayload<Mission>>,
) -> Result<Json<Vec<Mission>>, AppError> {
    let storage = app.storage();
    let stored = tokio::task::spawn_blocking(move || storage.post_entity(payload))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(stored))
}
