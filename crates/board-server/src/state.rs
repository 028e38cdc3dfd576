use board_core::storage::Storage;
use std::path::PathBuf;

/// Shared application state passed to all route handlers.
///
/// The server holds no in-memory document; every request reads and writes
/// the JSON data file through a fresh local-only [`Storage`], so external
/// writers (the CLI, another server instance) are always picked up.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
}

impl AppState {
    pub fn new(data_path: PathBuf) -> Self {
        Self { data_path }
    }

    pub fn storage(&self) -> Storage {
        Storage::local_only(&self.data_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_stores_data_path() {
        let state = AppState::new(PathBuf::from("/tmp/data.json"));
        assert_eq!(state.data_path, PathBuf::from("/tmp/data.json"));
    }

    // Local-only storage must never build the blocking HTTP client: doing so
    // inside a tokio runtime panics, and handlers open storage in async fns.
    #[tokio::test]
    async fn storage_opens_inside_async_runtime() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(dir.path().join("data.json"));
        let doc = state.storage().load_data();
        assert!(doc.missions.is_empty());
    }
}
