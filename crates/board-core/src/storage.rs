use crate::document::{upsert_by_id, Document, DocumentPatch, Entity};
use crate::error::{BoardError, Result};
use crate::io::atomic_write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, OnceLock};

/// Outcome of one background mirror write. Callers who care can subscribe via
/// [`Storage::mirror_events`]; by default nobody waits on these.
#[derive(Debug, Clone)]
pub enum MirrorEvent {
    Flushed { endpoint: String },
    Failed { endpoint: String, error: String },
}

/// Reads and writes the single JSON document, optionally mirrored to a
/// remote data server.
///
/// Local writes are synchronous and atomic. Remote mirroring of `save_data`
/// is fire-and-forget on a detached thread: failures are logged and reported
/// on the event channel, never surfaced to the caller. `post_entity` and
/// `sync_remote_data` block on the network and do propagate failures.
pub struct Storage {
    data_path: PathBuf,
    remote_url: Option<String>,
    client: OnceLock<reqwest::blocking::Client>,
    mirror_cancelled: Arc<AtomicBool>,
    mirror_tx: mpsc::Sender<MirrorEvent>,
    mirror_rx: Option<mpsc::Receiver<MirrorEvent>>,
}

impl Storage {
    pub fn new(data_path: impl Into<PathBuf>, remote_url: Option<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            data_path: data_path.into(),
            remote_url: remote_url.map(|u| u.trim_end_matches('/').to_string()),
            client: OnceLock::new(),
            mirror_cancelled: Arc::new(AtomicBool::new(false)),
            mirror_tx: tx,
            mirror_rx: Some(rx),
        }
    }

    /// Built on first remote use. The blocking client spins up an internal
    /// runtime thread and panics when constructed inside an async context, so
    /// a `Storage` with no remote must never touch it.
    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(reqwest::blocking::Client::new)
    }

    pub fn local_only(data_path: impl Into<PathBuf>) -> Self {
        Self::new(data_path, None)
    }

    pub fn data_path(&self) -> &std::path::Path {
        &self.data_path
    }

    /// Take the receiving end of the mirror event channel. Can be taken once.
    pub fn mirror_events(&mut self) -> Option<mpsc::Receiver<MirrorEvent>> {
        self.mirror_rx.take()
    }

    /// Stop any further mirror posts from being issued. Already-started
    /// requests run to completion.
    pub fn cancel_mirror(&self) {
        self.mirror_cancelled.store(true, Ordering::SeqCst);
    }

    fn read_local(&self) -> Option<Document> {
        let raw = match std::fs::read_to_string(&self.data_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.data_path.display(), error = %e, "failed to read data file");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(path = %self.data_path.display(), error = %e, "data file is not valid JSON");
                None
            }
        }
    }

    fn write_local(&self, doc: &Document) -> Result<()> {
        let data = serde_json::to_vec_pretty(doc)?;
        atomic_write(&self.data_path, &data)
    }

    /// The last-known merged document.
    ///
    /// With a remote configured and a cache present this returns the stale
    /// cached copy and refreshes the cache in the background for the next
    /// read; it is not strongly consistent.
    pub fn load_data(&self) -> Document {
        let cached = self.read_local();
        match (&self.remote_url, cached) {
            (Some(url), Some(doc)) => {
                self.spawn_cache_refresh(url.clone());
                doc
            }
            (Some(_), None) => Document::default(),
            (None, Some(doc)) => doc,
            (None, None) => Document::default(),
        }
    }

    fn spawn_cache_refresh(&self, url: String) {
        let client = self.client().clone();
        let data_path = self.data_path.clone();
        std::thread::spawn(move || {
            let fetched = client
                .get(format!("{url}/data"))
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.json::<Document>());
            match fetched {
                Ok(doc) => {
                    if let Ok(data) = serde_json::to_vec_pretty(&doc) {
                        if let Err(e) = atomic_write(&data_path, &data) {
                            tracing::warn!(error = %e, "cache refresh write failed");
                        }
                    }
                }
                Err(e) => tracing::debug!(error = %e, "background cache refresh failed"),
            }
        });
    }

    /// Shallow-merge `patch` into the stored document and write it locally.
    /// If a remote is configured, the merged document is mirrored with a
    /// fire-and-forget POST whose failure is only logged. Returns the merged
    /// document.
    pub fn save_data(&self, patch: DocumentPatch) -> Document {
        let mut doc = self.read_local().unwrap_or_default();
        doc.apply(patch);

        if let Err(e) = self.write_local(&doc) {
            // Local durability is best-effort: the in-memory state already
            // reflects the mutation and the caller has no feedback channel.
            tracing::error!(path = %self.data_path.display(), error = %e, "saveData failed");
        }

        if let Some(url) = &self.remote_url {
            self.spawn_mirror(url.clone(), doc.clone());
        }
        doc
    }

    fn spawn_mirror(&self, url: String, doc: Document) {
        let client = self.client().clone();
        let cancelled = self.mirror_cancelled.clone();
        let tx = self.mirror_tx.clone();
        std::thread::spawn(move || {
            let endpoint = format!("{url}/data");
            if cancelled.load(Ordering::SeqCst) {
                return;
            }
            let result = client
                .post(&endpoint)
                .json(&doc)
                .send()
                .and_then(|r| r.error_for_status());
            let event = match result {
                Ok(_) => MirrorEvent::Flushed {
                    endpoint: endpoint.clone(),
                },
                Err(e) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "remote save failed");
                    MirrorEvent::Failed {
                        endpoint: endpoint.clone(),
                        error: e.to_string(),
                    }
                }
            };
            // Nobody may be listening; that is fine.
            let _ = tx.send(event);
        });
    }

    /// Upsert records into one entity collection locally and, when a remote
    /// is configured, POST the payload to its per-collection endpoint. Unlike
    /// `save_data` this blocks on the network call and propagates failures,
    /// so the caller gets an explicit success signal.
    pub fn post_entity<T: Entity>(&self, payload: EntityPayload<T>) -> Result<Vec<T>> {
        let payload = payload.with_ids();

        let mut doc = self.read_local().unwrap_or_default();
        let collection = T::collection_mut(&mut doc);
        match &payload {
            EntityPayload::Many(records) => {
                for record in records {
                    upsert_by_id(collection, record.clone());
                }
            }
            EntityPayload::One(record) => {
                upsert_by_id(collection, record.clone());
            }
        }
        self.write_local(&doc)?;

        let Some(url) = &self.remote_url else {
            return Ok(T::collection_mut(&mut doc).clone());
        };

        let endpoint = format!("{url}/{}", T::COLLECTION);
        let resp = self.client().post(&endpoint).json(&payload).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(BoardError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<Vec<T>>()?)
    }

    /// Fetch the authoritative document from the remote and overwrite the
    /// local cache. All errors are swallowed (logged) and the cached copy is
    /// returned instead, so startup always succeeds.
    pub fn sync_remote_data(&self) -> Document {
        if let Some(url) = &self.remote_url {
            let fetched = self
                .client()
                .get(format!("{url}/data"))
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.json::<Document>());
            match fetched {
                Ok(doc) => {
                    if let Err(e) = self.write_local(&doc) {
                        tracing::warn!(error = %e, "failed to cache synced document");
                    }
                    return doc;
                }
                Err(e) => tracing::warn!(error = %e, "syncRemoteData failed"),
            }
        }
        self.read_local().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// EntityPayload
// ---------------------------------------------------------------------------

/// Body for a per-collection POST: a single record or an array; every record
/// updates-or-inserts by id into the existing collection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum EntityPayload<T> {
    Many(Vec<T>),
    One(T),
}

impl<T: Entity> EntityPayload<T> {
    /// Generate ids for any record that lacks one.
    fn with_ids(self) -> Self {
        let assign = |mut r: T| {
            if r.id().is_empty() {
                r.set_id(uuid::Uuid::new_v4().to_string());
            }
            r
        };
        match self {
            EntityPayload::Many(records) => {
                EntityPayload::Many(records.into_iter().map(assign).collect())
            }
            EntityPayload::One(record) => EntityPayload::One(assign(record)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::NewMission;
    use crate::profile::Profile;
    use crate::types::Owner;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn doc_with_user(id: &str) -> Document {
        Document {
            current_user_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn save_then_load_roundtrip_local() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::local_only(dir.path().join("data.json"));

        let mission = NewMission::new(Owner::user("u1")).title("hello").build_at(Utc::now());
        storage.save_data(DocumentPatch::missions(vec![mission.clone()]));

        let loaded = storage.load_data();
        assert_eq!(loaded.missions.len(), 1);
        assert_eq!(loaded.missions[0].id, mission.id);
    }

    #[test]
    fn save_merges_shallowly_across_calls() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::local_only(dir.path().join("data.json"));

        storage.save_data(DocumentPatch::current_user(Some("u1".to_string())));
        let mission = NewMission::new(Owner::user("u1")).build_at(Utc::now());
        let merged = storage.save_data(DocumentPatch::missions(vec![mission]));

        assert_eq!(merged.current_user_id.as_deref(), Some("u1"));
        assert_eq!(merged.missions.len(), 1);
    }

    #[test]
    fn load_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::local_only(dir.path().join("nope.json"));
        let doc = storage.load_data();
        assert!(doc.missions.is_empty());
    }

    #[test]
    fn corrupt_file_degrades_to_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = Storage::local_only(&path);
        let doc = storage.load_data();
        assert!(doc.missions.is_empty());
    }

    #[test]
    fn save_data_mirrors_fire_and_forget() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/data")
            .with_status(200)
            .with_body("{}")
            .create();

        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path().join("data.json"), Some(server.url()));
        let events = storage.mirror_events().unwrap();

        storage.save_data(DocumentPatch::current_user(Some("u1".to_string())));

        match events.recv_timeout(Duration::from_secs(10)).unwrap() {
            MirrorEvent::Flushed { endpoint } => assert!(endpoint.ends_with("/data")),
            MirrorEvent::Failed { error, .. } => panic!("mirror failed: {error}"),
        }
        mock.assert();
    }

    #[test]
    fn mirror_failure_is_reported_not_raised() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/data")
            .with_status(500)
            .with_body("{\"error\":\"boom\"}")
            .create();

        let dir = TempDir::new().unwrap();
        let mut storage = Storage::new(dir.path().join("data.json"), Some(server.url()));
        let events = storage.mirror_events().unwrap();

        // The call itself succeeds; the failure only shows on the channel.
        let merged = storage.save_data(DocumentPatch::current_user(Some("u1".to_string())));
        assert_eq!(merged.current_user_id.as_deref(), Some("u1"));

        match events.recv_timeout(Duration::from_secs(10)).unwrap() {
            MirrorEvent::Failed { .. } => {}
            MirrorEvent::Flushed { .. } => panic!("expected failure event"),
        }
    }

    #[test]
    fn cancelled_mirror_sends_nothing() {
        let mut server = mockito::Server::new();
        let mock = server.mock("POST", "/data").expect(0).create();

        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("data.json"), Some(server.url()));
        storage.cancel_mirror();
        storage.save_data(DocumentPatch::current_user(Some("u1".to_string())));

        std::thread::sleep(Duration::from_millis(300));
        mock.assert();
    }

    #[test]
    fn sync_remote_overwrites_cache() {
        let mut server = mockito::Server::new();
        let body = serde_json::to_string(&doc_with_user("remote-user")).unwrap();
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let storage = Storage::new(&path, Some(server.url()));

        let doc = storage.sync_remote_data();
        assert_eq!(doc.current_user_id.as_deref(), Some("remote-user"));

        let on_disk: Document =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.current_user_id.as_deref(), Some("remote-user"));
    }

    #[test]
    fn sync_remote_falls_back_to_cache_on_error() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/data").with_status(500).create();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, serde_json::to_string(&doc_with_user("cached")).unwrap()).unwrap();
        let storage = Storage::new(&path, Some(server.url()));

        let doc = storage.sync_remote_data();
        assert_eq!(doc.current_user_id.as_deref(), Some("cached"));
    }

    #[test]
    fn load_returns_stale_cache_then_refreshes() {
        let mut server = mockito::Server::new();
        let body = serde_json::to_string(&doc_with_user("fresh")).unwrap();
        let mock = server
            .mock("GET", "/data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, serde_json::to_string(&doc_with_user("stale")).unwrap()).unwrap();
        let storage = Storage::new(&path, Some(server.url()));

        // First read serves the stale cache.
        let doc = storage.load_data();
        assert_eq!(doc.current_user_id.as_deref(), Some("stale"));

        // The background refresh eventually replaces the cache.
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        loop {
            let raw = std::fs::read_to_string(&path).unwrap();
            if raw.contains("fresh") {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "cache never refreshed");
            std::thread::sleep(Duration::from_millis(50));
        }
        mock.assert();
    }

    #[test]
    fn post_entity_upserts_locally_without_remote() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::local_only(dir.path().join("data.json"));

        let mission = NewMission::new(Owner::user("u1")).title("a").build_at(Utc::now());
        let stored = storage.post_entity(EntityPayload::One(mission.clone())).unwrap();
        assert_eq!(stored.len(), 1);

        let mut updated = mission.clone();
        updated.title = "b".to_string();
        let stored = storage.post_entity(EntityPayload::One(updated)).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "b");
    }

    #[test]
    fn post_entity_array_upserts_each_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let storage = Storage::local_only(&path);

        let a = NewMission::new(Owner::user("u1")).title("a").build_at(Utc::now());
        storage.post_entity(EntityPayload::One(a.clone())).unwrap();

        // An array merges into the stored collection instead of replacing it.
        let b = NewMission::new(Owner::user("u1")).title("b").build_at(Utc::now());
        let stored = storage.post_entity(EntityPayload::Many(vec![b.clone()])).unwrap();
        assert_eq!(stored.len(), 2);

        // A known id inside an array updates in place.
        let mut a2 = a.clone();
        a2.title = "a renamed".to_string();
        let stored = storage.post_entity(EntityPayload::Many(vec![a2])).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(
            stored.iter().find(|m| m.id == a.id).unwrap().title,
            "a renamed"
        );

        let on_disk: Document =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.missions.len(), 2);
    }

    #[test]
    fn post_entity_surfaces_remote_rejection() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/profiles")
            .with_status(409)
            .with_body("{\"error\":\"duplicate email\"}")
            .create();

        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("data.json"), Some(server.url()));

        let profile = Profile {
            id: "p1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            external_auth_id: None,
            achievements: Default::default(),
            created_at: Utc::now(),
        };
        let err = storage.post_entity(EntityPayload::One(profile)).unwrap_err();
        match err {
            BoardError::Remote { status, body } => {
                assert_eq!(status, 409);
                assert!(body.contains("duplicate email"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn post_entity_array_reaches_remote_endpoint() {
        let mut server = mockito::Server::new();
        let m = NewMission::new(Owner::user("u1")).title("only").build_at(Utc::now());
        let reply = serde_json::to_string(&vec![m.clone()]).unwrap();
        let mock = server
            .mock("POST", "/missions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply)
            .create();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let storage = Storage::new(&path, Some(server.url()));

        let stored = storage
            .post_entity(EntityPayload::Many(vec![m.clone()]))
            .unwrap();
        assert_eq!(stored.len(), 1);
        mock.assert();

        let on_disk: Document =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.missions.len(), 1);
        assert_eq!(on_disk.missions[0].id, m.id);
    }
}
