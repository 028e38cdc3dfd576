use crate::ledger::Ledger;
use crate::mission::Mission;
use crate::notification::NotificationLog;
use crate::profile::Profile;
use crate::team::Team;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The whole persisted application state as one JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub missions: Vec<Mission>,
    /// Ledgers keyed by owner id.
    pub achievements: BTreeMap<String, Ledger>,
    pub profiles: Vec<Profile>,
    pub teams: Vec<Team>,
    pub notifications_by_user: NotificationLog,
    pub current_user_id: Option<String>,
}

/// Shallow-merge partial of [`Document`]: a present key replaces the stored
/// value wholesale (arrays are never appended to or unioned).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missions: Option<Vec<Mission>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<BTreeMap<String, Ledger>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<Profile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<Team>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_by_user: Option<NotificationLog>,
    #[serde(skip_serializing_if = "Option::is_none", with = "double_option")]
    pub current_user_id: Option<Option<String>>,
}

impl DocumentPatch {
    pub fn missions(missions: Vec<Mission>) -> Self {
        Self {
            missions: Some(missions),
            ..Default::default()
        }
    }

    pub fn achievements(achievements: BTreeMap<String, Ledger>) -> Self {
        Self {
            achievements: Some(achievements),
            ..Default::default()
        }
    }

    pub fn profiles(profiles: Vec<Profile>) -> Self {
        Self {
            profiles: Some(profiles),
            ..Default::default()
        }
    }

    pub fn teams(teams: Vec<Team>) -> Self {
        Self {
            teams: Some(teams),
            ..Default::default()
        }
    }

    pub fn notifications(log: NotificationLog) -> Self {
        Self {
            notifications_by_user: Some(log),
            ..Default::default()
        }
    }

    pub fn current_user(id: Option<String>) -> Self {
        Self {
            current_user_id: Some(id),
            ..Default::default()
        }
    }
}

impl Document {
    /// Apply a shallow-merge patch: each present top-level key replaces the
    /// stored value.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(missions) = patch.missions {
            self.missions = missions;
        }
        if let Some(achievements) = patch.achievements {
            self.achievements = achievements;
        }
        if let Some(profiles) = patch.profiles {
            self.profiles = profiles;
        }
        if let Some(teams) = patch.teams {
            self.teams = teams;
        }
        if let Some(log) = patch.notifications_by_user {
            self.notifications_by_user = log;
        }
        if let Some(id) = patch.current_user_id {
            self.current_user_id = id;
        }
    }
}

/// Distinguishes "key absent" (outer None, skipped) from "key present and
/// null" (inner None) for patch fields that can be explicitly cleared.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Entity — collections addressable by name for per-entity upserts
// ---------------------------------------------------------------------------

/// A record stored in one of the document's id-keyed collections, addressable
/// by the collection name used on the wire (`/missions`, `/profiles`).
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn collection_mut(doc: &mut Document) -> &mut Vec<Self>;
}

impl Entity for Mission {
    const COLLECTION: &'static str = "missions";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.missions
    }
}

impl Entity for Profile {
    const COLLECTION: &'static str = "profiles";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.profiles
    }
}

/// Insert-or-replace by id; records with an empty id get a generated one.
pub fn upsert_by_id<T: Entity>(collection: &mut Vec<T>, mut record: T) -> T {
    if record.id().is_empty() {
        record.set_id(uuid::Uuid::new_v4().to_string());
    }
    match collection.iter_mut().find(|r| r.id() == record.id()) {
        Some(existing) => *existing = record.clone(),
        None => collection.push(record.clone()),
    }
    record
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::NewMission;
    use crate::types::Owner;
    use chrono::Utc;

    #[test]
    fn patch_replaces_array_keys_wholesale() {
        let mut doc = Document::default();
        doc.missions = vec![
            NewMission::new(Owner::user("u1")).title("a").build_at(Utc::now()),
            NewMission::new(Owner::user("u1")).title("b").build_at(Utc::now()),
        ];
        let replacement = vec![NewMission::new(Owner::user("u2")).title("c").build_at(Utc::now())];

        doc.apply(DocumentPatch::missions(replacement));
        assert_eq!(doc.missions.len(), 1);
        assert_eq!(doc.missions[0].title, "c");
    }

    #[test]
    fn patch_leaves_absent_keys_untouched(){
        let mut doc = Document::default();
        doc.current_user_id = Some("u1".to_string());
        doc.teams = vec![crate::team::Team {
            id: "t1".to_string(),
            name: "Alpha".to_string(),
            members: Vec::new(),
            missions: Vec::new(),
            created_at: Utc::now(),
        }];

        doc.apply(DocumentPatch::missions(Vec::new()));
        assert_eq!(doc.current_user_id.as_deref(), Some("u1"));
        assert_eq!(doc.teams.len(), 1);
    }

    #[test]
    fn patch_can_clear_current_user() {
        let mut doc = Document::default();
        doc.current_user_id = Some("u1".to_string());
        doc.apply(DocumentPatch::current_user(None));
        assert!(doc.current_user_id.is_none());
    }

    #[test]
    fn patch_json_with_null_current_user_clears() {
        let patch: DocumentPatch = serde_json::from_str(r#"{"currentUserId":null}"#).unwrap();
        assert_eq!(patch.current_user_id, Some(None));

        let patch: DocumentPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.current_user_id, None);
    }

    #[test]
    fn empty_document_parses_from_empty_object() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert!(doc.missions.is_empty());
        assert!(doc.profiles.is_empty());
        assert!(doc.current_user_id.is_none());
    }

    #[test]
    fn upsert_generates_id_when_missing() {
        let mut collection: Vec<Mission> = Vec::new();
        let mut m = NewMission::new(Owner::user("u1")).build_at(Utc::now());
        m.id = String::new();
        let stored = upsert_by_id(&mut collection, m);
        assert!(!stored.id.is_empty());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut collection: Vec<Mission> = Vec::new();
        let m = NewMission::new(Owner::user("u1")).title("old").build_at(Utc::now());
        upsert_by_id(&mut collection, m.clone());

        let mut updated = m.clone();
        updated.title = "new".to_string();
        upsert_by_id(&mut collection, updated);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection[0].title, "new");
    }
}
