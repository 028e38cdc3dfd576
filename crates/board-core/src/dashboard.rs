use crate::board::Board;
use crate::ledger::Ledger;
use crate::mission::{Mission, MissionFilter};
use crate::notification::Notification;
use crate::profile::Profile;
use crate::team::TeamView;
use crate::types::Owner;
use serde::Serialize;

/// Everything one user's dashboard screen needs, assembled in a single pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub missions: Vec<Mission>,
    pub achievements: Ledger,
    pub teams: Vec<TeamView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub notifications: Vec<Notification>,
}

impl Board {
    /// Assemble the dashboard read model for one user. Duplicate mission
    /// titles are collapsed first so the view never shows repeats; only
    /// teams the user belongs to are included.
    pub fn prepare_user_dashboard(&mut self, user_id: &str) -> Dashboard {
        let owner = Owner::user(user_id);
        let missions = self.dedupe_missions_for(&owner);

        let teams = self
            .teams_with_members()
            .into_iter()
            .filter(|t| t.members.iter().any(|m| m.id == user_id))
            .collect();

        Dashboard {
            missions,
            achievements: self.ledger(user_id),
            teams,
            profile: self.profile(user_id).cloned(),
            notifications: self.notifications(user_id, false),
        }
    }

    /// All teams with member ids resolved, for the teams screen.
    pub fn prepare_teams(&self) -> Vec<TeamView> {
        self.teams_with_members()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
