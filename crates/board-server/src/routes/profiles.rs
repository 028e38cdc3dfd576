use axum::extract::State;
use axum::Json;
use board_core::profile::Profile;
use board_core::storage::EntityPayload;

use crate::error::AppError;
use crate::state::AppState;

/// GET /profiles — the profiles collection.
pub async fn list_profiles(State(app): State<AppState>) -> Result<Json<Vec<Profile>>, AppError> {
    let storage = app.storage();
    let doc = tokio::task::spawn_blocking(move || storage.load_data())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(doc.profiles))
}

/// POST /profiles — upsert one profile or an array of profiles by id. Any
/// record whose email belongs to a different stored profile is rejected
/// with 409.
pub async fn post_profiles(
    State(app): State<AppState>,
    Json(payload): Json<EntityPayload<Profile>>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let storage = app.storage();
    let stored = tokio::task::spawn_blocking(move || {
        let existing = storage.load_data().profiles;
        let incoming: &[Profile] = match &payload {
            EntityPayload::Many(records) => records,
            EntityPayload::One(record) => std::slice::from_ref(record),
        };
        super::data::check_unique_emails(incoming, &existing)?;
        storage.post_entity(payload)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(stored))
}
