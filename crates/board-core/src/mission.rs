use crate::types::{Category, Owner, OwnerKind, Priority, Recurrence};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Mission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_points")]
    pub points: u32,
    pub owner_type: OwnerKind,
    pub owner_id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub custom_interval: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub next_due_date: Option<DateTime<Utc>>,
}

fn default_points() -> u32 {
    10
}

impl Mission {
    pub fn owner(&self) -> Owner {
        Owner {
            kind: self.owner_type,
            id: self.owner_id.clone(),
        }
    }

    pub fn belongs_to(&self, owner: &Owner) -> bool {
        self.owner_type == owner.kind && self.owner_id == owner.id
    }
}

// ---------------------------------------------------------------------------
// NewMission — creation input with the board's defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NewMission {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub points: u32,
    pub owner: Owner,
    pub recurrence: Option<Recurrence>,
    pub custom_interval: u32,
    pub priority: Priority,
    pub tags: Vec<String>,
}

impl NewMission {
    pub fn new(owner: Owner) -> Self {
        Self {
            title: "Untitled".to_string(),
            description: String::new(),
            category: Category::Personal,
            points: 10,
            owner,
            recurrence: None,
            custom_interval: 0,
            priority: Priority::Medium,
            tags: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    /// Materialize the mission record at an explicit creation instant.
    pub fn build_at(self, now: DateTime<Utc>) -> Mission {
        Mission {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            category: self.category,
            points: self.points,
            owner_type: self.owner.kind,
            owner_id: self.owner.id,
            completed: false,
            progress: 0,
            created_at: now,
            next_due_date: self.recurrence.map(|_| now),
            recurrence: self.recurrence,
            custom_interval: self.custom_interval,
            priority: self.priority,
            tags: self.tags,
        }
    }
}

// ---------------------------------------------------------------------------
// MissionUpdate — typed partial update with an explicit field whitelist
// ---------------------------------------------------------------------------

/// Partial update applied by `Board::update_mission`. Only the fields listed
/// here may change; unknown JSON keys are rejected at deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MissionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub points: Option<u32>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub recurrence: Option<Option<Recurrence>>,
    pub custom_interval: Option<u32>,
    pub next_due_date: Option<Option<DateTime<Utc>>>,
}

impl MissionUpdate {
    pub fn apply(&self, mission: &mut Mission) {
        if let Some(title) = &self.title {
            mission.title = title.clone();
        }
        if let Some(description) = &self.description {
            mission.description = description.clone();
        }
        if let Some(category) = self.category {
            mission.category = category;
        }
        if let Some(points) = self.points {
            mission.points = points;
        }
        if let Some(priority) = self.priority {
            mission.priority = priority;
        }
        if let Some(tags) = &self.tags {
            mission.tags = tags.clone();
        }
        if let Some(recurrence) = self.recurrence {
            mission.recurrence = recurrence;
        }
        if let Some(interval) = self.custom_interval {
            mission.custom_interval = interval;
        }
        if let Some(next_due) = self.next_due_date {
            mission.next_due_date = next_due;
        }
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MissionFilter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring match against any of the mission's tags.
    pub tag: Option<String>,
}

pub fn missions_for(missions: &[Mission], owner: &Owner, filter: &MissionFilter) -> Vec<Mission> {
    missions
        .iter()
        .filter(|m| m.belongs_to(owner))
        .filter(|m| filter.category.is_none_or(|c| m.category == c))
        .filter(|m| filter.priority.is_none_or(|p| m.priority == p))
        .filter(|m| match &filter.tag {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                m.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            }
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Recurrence rollover
// ---------------------------------------------------------------------------

/// Next due date for a recurring mission completed at `from`.
///
/// Daily adds a day, weekly a week, custom adds `custom_interval` days only
/// when the interval is positive; a custom mission with a zero interval comes
/// due again immediately, matching the board's historical behavior.
pub fn rollover_due_date(mission: &Mission, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let recurrence = mission.recurrence?;
    let days = match recurrence {
        Recurrence::Daily => 1,
        Recurrence::Weekly => 7,
        Recurrence::Custom if mission.custom_interval > 0 => mission.custom_interval as i64,
        Recurrence::Custom => 0,
    };
    Some(from + Duration::days(days))
}

// ---------------------------------------------------------------------------
// Title dedupe
// ---------------------------------------------------------------------------

fn normalized_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Collapse one owner's missions whose normalized titles repeat, keeping the
/// newest by `created_at`. The deduped set is placed (newest first) ahead of
/// every other owner's missions, which keep their relative order. Idempotent.
/// Returns the kept missions.
pub fn dedupe_for(missions: &mut Vec<Mission>, owner: &Owner) -> Vec<Mission> {
    let mut owned: Vec<Mission> = missions.iter().filter(|m| m.belongs_to(owner)).cloned().collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
    let mut keep: Vec<Mission> = Vec::new();
    for m in owned {
        if seen.insert(normalized_title(&m.title)) {
            keep.push(m);
        }
    }

    let others: Vec<Mission> = missions.iter().filter(|m| !m.belongs_to(owner)).cloned().collect();
    let mut rebuilt = keep.clone();
    rebuilt.extend(others);
    *missions = rebuilt;
    keep
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
