use crate::error::{BoardError, Result};
use crate::ledger::Ledger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Opaque id from the external identity provider; credentials never
    /// pass through the board.
    #[serde(default)]
    pub external_auth_id: Option<String>,
    #[serde(default)]
    pub achievements: Ledger,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Partial profile update. Credential material is handled by the external
/// identity provider and has no fields here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub external_auth_id: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(auth_id) = &self.external_auth_id {
            profile.external_auth_id = auth_id.clone();
        }
    }
}

/// Append a profile, enforcing global email uniqueness.
pub fn create_profile(
    profiles: &mut Vec<Profile>,
    name: impl Into<String>,
    email: impl Into<String>,
    external_auth_id: Option<String>,
) -> Result<Profile> {
    let email = email.into();
    if profiles.iter().any(|p| p.email == email) {
        return Err(BoardError::EmailExists(email));
    }
    let profile = Profile {
        id: Uuid::new_v4().to_string(),
        name: name.into(),
        email,
        external_auth_id,
        achievements: Ledger::default(),
        created_at: Utc::now(),
    };
    profiles.push(profile.clone());
    Ok(profile)
}

// ---------------------------------------------------------------------------
// Leaderboard projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardMetric {
    #[default]
    Points,
    Streak,
    Badges,
}

impl std::str::FromStr for LeaderboardMetric {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "points" => Ok(LeaderboardMetric::Points),
            "streak" => Ok(LeaderboardMetric::Streak),
            "badges" => Ok(LeaderboardMetric::Badges),
            _ => Err(BoardError::InvalidMetric(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub value: u32,
}

/// Profiles projected to (id, name, metric value), sorted descending. The
/// live ledger map is authoritative; the snapshot embedded in the profile
/// record covers users who have not earned anything since import.
pub fn leaderboard(
    profiles: &[Profile],
    ledgers: &std::collections::BTreeMap<String, Ledger>,
    metric: LeaderboardMetric,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = profiles
        .iter()
        .map(|p| {
            let ledger = ledgers.get(&p.id).unwrap_or(&p.achievements);
            LeaderboardEntry {
                id: p.id.clone(),
                name: p.name.clone(),
                value: match metric {
                    LeaderboardMetric::Points => ledger.points,
                    LeaderboardMetric::Streak => ledger.streak,
                    LeaderboardMetric::Badges => ledger.badges.len() as u32,
                },
            }
        })
        .collect();
    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
