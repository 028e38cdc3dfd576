use crate::profile::Profile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Profile ids, no duplicates.
    #[serde(default)]
    pub members: Vec<String>,
    /// Mission ids assigned to the team, no duplicates.
    #[serde(default)]
    pub missions: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

pub fn create_team(teams: &mut Vec<Team>, name: impl Into<String>) -> Team {
    let team = Team {
        id: Uuid::new_v4().to_string(),
        name: name.into(),
        members: Vec::new(),
        missions: Vec::new(),
        created_at: Utc::now(),
    };
    teams.push(team.clone());
    team
}

/// Add a member; both the team and the profile must exist.
pub fn add_member(
    teams: &mut [Team],
    profiles: &[Profile],
    team_id: &str,
    profile_id: &str,
) -> Option<Team> {
    if !profiles.iter().any(|p| p.id == profile_id) {
        return None;
    }
    let team = teams.iter_mut().find(|t| t.id == team_id)?;
    if !team.members.iter().any(|id| id == profile_id) {
        team.members.push(profile_id.to_string());
    }
    Some(team.clone())
}

pub fn remove_member(teams: &mut [Team], team_id: &str, profile_id: &str) -> Option<Team> {
    let team = teams.iter_mut().find(|t| t.id == team_id)?;
    team.members.retain(|id| id != profile_id);
    Some(team.clone())
}

pub fn assign_mission(teams: &mut [Team], team_id: &str, mission_id: &str) -> Option<Team> {
    let team = teams.iter_mut().find(|t| t.id == team_id)?;
    if !team.missions.iter().any(|id| id == mission_id) {
        team.missions.push(mission_id.to_string());
    }
    Some(team.clone())
}

// ---------------------------------------------------------------------------
// Read model with resolved members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamView {
    pub id: String,
    pub name: String,
    pub members: Vec<MemberView>,
    pub missions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Teams with member ids resolved to profiles; unknown ids become an
/// "Unknown" placeholder rather than being dropped.
pub fn teams_with_members(teams: &[Team], profiles: &[Profile]) -> Vec<TeamView> {
    teams.iter().map(|t| team_view(t, profiles)).collect()
}

pub fn team_view(team: &Team, profiles: &[Profile]) -> TeamView {
    TeamView {
        id: team.id.clone(),
        name: team.name.clone(),
        members: team
            .members
            .iter()
            .map(|member_id| match profiles.iter().find(|p| &p.id == member_id) {
                Some(p) => MemberView {
                    id: p.id.clone(),
                    name: p.name.clone(),
                },
                None => MemberView {
                    id: member_id.clone(),
                    name: "Unknown".to_string(),
                },
            })
            .collect(),
        missions: team.missions.clone(),
        created_at: team.created_at,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
