use crate::document::{Document, DocumentPatch};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::mission::{self, Mission, MissionFilter, MissionUpdate, NewMission};
use crate::notification::{self, Notification};
use crate::profile::{self, LeaderboardEntry, LeaderboardMetric, Profile, ProfileUpdate};
use crate::storage::{EntityPayload, MirrorEvent, Storage};
use crate::team::{self, Team, TeamView};
use crate::toast::ToastHub;
use crate::types::{NotificationKind, Owner};
use chrono::Utc;
use std::sync::mpsc;

/// The store facade: owns the in-memory document and a persistence handle,
/// and wires mission mutations to their achievement and notification side
/// effects.
///
/// Every mutation executes to completion before returning; only remote
/// mirror writes happen on background threads. Unknown-id lookups return
/// `None`/`false` rather than erroring.
pub struct Board {
    doc: Document,
    storage: Storage,
    toasts: ToastHub,
}

impl Board {
    pub fn new(doc: Document, storage: Storage) -> Self {
        Self {
            doc,
            storage,
            toasts: ToastHub::default(),
        }
    }

    /// Load the board from its persistence handle.
    pub fn open(storage: Storage) -> Self {
        let doc = storage.load_data();
        Self::new(doc, storage)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn toasts_mut(&mut self) -> &mut ToastHub {
        &mut self.toasts
    }

    pub fn mirror_events(&mut self) -> Option<mpsc::Receiver<MirrorEvent>> {
        self.storage.mirror_events()
    }

    pub fn cancel_mirror(&self) {
        self.storage.cancel_mirror();
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    // -----------------------------------------------------------------------
    // Missions
    // -----------------------------------------------------------------------

    /// Create a mission and prepend it to the list (newest first).
    pub fn add_mission(&mut self, new: NewMission) -> Mission {
        let mission = new.build_at(Utc::now());
        self.doc.missions.insert(0, mission.clone());
        self.persist_missions();
        let owner_id = mission.owner_id.clone();
        self.notify_mission_update(&mission, &owner_id);
        mission
    }

    pub fn missions_for(&self, owner: &Owner, filter: &MissionFilter) -> Vec<Mission> {
        mission::missions_for(&self.doc.missions, owner, filter)
    }

    pub fn mission(&self, id: &str, owner: &Owner) -> Option<&Mission> {
        self.doc
            .missions
            .iter()
            .find(|m| m.id == id && m.belongs_to(owner))
    }

    /// Flip completion. A transition to completed awards points, advances
    /// the streak and re-checks badges; a recurring mission then rolls over
    /// immediately (due again later, completed=false, progress=0) instead of
    /// staying done.
    pub fn toggle_mission(&mut self, id: &str, owner: &Owner) -> Option<Mission> {
        let now = Utc::now();
        let idx = self
            .doc
            .missions
            .iter()
            .position(|m| m.id == id && m.belongs_to(owner))?;

        let (transitioned, points) = {
            let m = &mut self.doc.missions[idx];
            m.completed = !m.completed;
            let transitioned = m.completed;
            let points = m.points;
            if m.completed && m.recurrence.is_some() {
                m.next_due_date = mission::rollover_due_date(m, now);
                m.completed = false;
                m.progress = 0;
            }
            (transitioned, points)
        };

        if transitioned {
            self.complete_award(&owner.id, points);
        }
        self.persist_missions();

        let updated = self.doc.missions[idx].clone();
        self.notify_mission_update(&updated, &owner.id);
        Some(updated)
    }

    /// Clamp progress into [0, 100]. Reaching 100 completes the mission and
    /// awards exactly once; repeat calls at 100 change nothing. Unlike
    /// `toggle_mission` this path applies no recurrence rollover.
    pub fn increase_progress(&mut self, id: &str, owner: &Owner, amount: u32) -> Option<Mission> {
        let idx = self
            .doc
            .missions
            .iter()
            .position(|m| m.id == id && m.belongs_to(owner))?;

        let (transitioned, points) = {
            let m = &mut self.doc.missions[idx];
            m.progress = (m.progress as u32).saturating_add(amount).min(100) as u8;
            if m.progress >= 100 && !m.completed {
                m.completed = true;
                (true, m.points)
            } else {
                (false, 0)
            }
        };

        if transitioned {
            self.complete_award(&owner.id, points);
        }
        self.persist_missions();

        let updated = self.doc.missions[idx].clone();
        self.notify_mission_update(&updated, &owner.id);
        Some(updated)
    }

    /// Apply a typed partial update. No notification is emitted.
    pub fn update_mission(
        &mut self,
        id: &str,
        owner: &Owner,
        update: &MissionUpdate,
    ) -> Option<Mission> {
        let m = self
            .doc
            .missions
            .iter_mut()
            .find(|m| m.id == id && m.belongs_to(owner))?;
        update.apply(m);
        let updated = m.clone();
        self.persist_missions();
        Some(updated)
    }

    /// Remove the first matching mission. Returns false for unknown ids.
    pub fn remove_mission(&mut self, id: &str, owner: &Owner) -> bool {
        let Some(idx) = self
            .doc
            .missions
            .iter()
            .position(|m| m.id == id && m.belongs_to(owner))
        else {
            return false;
        };
        self.doc.missions.remove(idx);
        self.persist_missions();
        true
    }

    /// Collapse this owner's repeated titles, keeping the newest each.
    pub fn dedupe_missions_for(&mut self, owner: &Owner) -> Vec<Mission> {
        let kept = mission::dedupe_for(&mut self.doc.missions, owner);
        self.persist_missions();
        kept
    }

    // -----------------------------------------------------------------------
    // Achievements
    // -----------------------------------------------------------------------

    /// Ledger snapshot for one owner id (default if none exists yet).
    pub fn ledger(&self, owner_id: &str) -> Ledger {
        self.doc.achievements.get(owner_id).cloned().unwrap_or_default()
    }

    /// The full award sequence for a completion: points, streak, badges.
    /// Newly unlocked badges fan out as achievement notifications.
    fn complete_award(&mut self, owner_id: &str, points: u32) {
        let ledger = self.doc.achievements.entry(owner_id.to_string()).or_default();
        ledger.award_points(points);
        ledger.update_streak();
        let unlocked = ledger.check_badges();

        self.storage
            .save_data(DocumentPatch::achievements(self.doc.achievements.clone()));

        for badge in unlocked {
            self.notify_achievement_unlocked(&badge, owner_id);
        }
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    pub fn add_notification(
        &mut self,
        user_id: &str,
        kind: NotificationKind,
        message: &str,
    ) -> Notification {
        let notif = self.doc.notifications_by_user.add(user_id, kind, message);
        self.persist_notifications();
        notif
    }

    pub fn notifications(&self, user_id: &str, only_unread: bool) -> Vec<Notification> {
        self.doc.notifications_by_user.for_user(user_id, only_unread)
    }

    pub fn mark_notification_read(&mut self, user_id: &str, notif_id: &str) -> bool {
        let marked = self.doc.notifications_by_user.mark_as_read(user_id, notif_id);
        if marked {
            self.persist_notifications();
        }
        marked
    }

    pub fn clear_notifications(&mut self, user_id: &str) {
        self.doc.notifications_by_user.clear(user_id);
        self.persist_notifications();
    }

    /// Store a mission notification; toast only for completions and full
    /// progress, not every minor tick.
    pub fn notify_mission_update(&mut self, mission: &Mission, user_id: &str) -> Notification {
        let message = notification::mission_update_message(mission);
        let notif = self.add_notification(user_id, NotificationKind::Mission, &message);
        if mission.completed || mission.progress >= 100 {
            self.toasts.show(&message, NotificationKind::Mission, 4000);
        }
        notif
    }

    pub fn notify_achievement_unlocked(&mut self, badge: &str, user_id: &str) -> Notification {
        let message = notification::badge_unlocked_message(badge);
        let notif = self.add_notification(user_id, NotificationKind::Achievement, &message);
        self.toasts.show(&message, NotificationKind::Achievement, 5000);
        notif
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    /// Create a profile; the awaited remote post propagates failures (unlike
    /// mission writes, the caller gets an explicit success signal).
    pub fn create_profile(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        external_auth_id: Option<String>,
    ) -> Result<Profile> {
        let created = profile::create_profile(&mut self.doc.profiles, name, email, external_auth_id)?;
        self.storage
            .save_data(DocumentPatch::profiles(self.doc.profiles.clone()));
        self.storage.post_entity(EntityPayload::One(created.clone()))?;
        Ok(created)
    }

    pub fn update_profile(&mut self, id: &str, update: &ProfileUpdate) -> Result<Option<Profile>> {
        let Some(p) = self.doc.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        update.apply(p);
        let updated = p.clone();
        self.storage
            .save_data(DocumentPatch::profiles(self.doc.profiles.clone()));
        self.storage.post_entity(EntityPayload::One(updated.clone()))?;
        Ok(Some(updated))
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.doc.profiles.iter().find(|p| p.id == id)
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.doc.profiles
    }

    pub fn leaderboard(&self, metric: LeaderboardMetric) -> Vec<LeaderboardEntry> {
        profile::leaderboard(&self.doc.profiles, &self.doc.achievements, metric)
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    pub fn create_team(&mut self, name: impl Into<String>) -> Team {
        let created = team::create_team(&mut self.doc.teams, name);
        self.persist_teams();
        created
    }

    pub fn add_team_member(&mut self, team_id: &str, profile_id: &str) -> Option<Team> {
        let updated = team::add_member(&mut self.doc.teams, &self.doc.profiles, team_id, profile_id)?;
        self.persist_teams();
        Some(updated)
    }

    pub fn remove_team_member(&mut self, team_id: &str, profile_id: &str) -> Option<Team> {
        let updated = team::remove_member(&mut self.doc.teams, team_id, profile_id)?;
        self.persist_teams();
        Some(updated)
    }

    pub fn assign_team_mission(&mut self, team_id: &str, mission_id: &str) -> Option<Team> {
        let updated = team::assign_mission(&mut self.doc.teams, team_id, mission_id)?;
        self.persist_teams();
        Some(updated)
    }

    pub fn teams(&self) -> &[Team] {
        &self.doc.teams
    }

    pub fn teams_with_members(&self) -> Vec<TeamView> {
        team::teams_with_members(&self.doc.teams, &self.doc.profiles)
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    pub fn set_current_user(&mut self, user_id: impl Into<String>) {
        self.doc.current_user_id = Some(user_id.into());
        self.storage
            .save_data(DocumentPatch::current_user(self.doc.current_user_id.clone()));
    }

    pub fn current_user(&self) -> Option<&str> {
        self.doc.current_user_id.as_deref()
    }

    pub fn clear_current_user(&mut self) {
        self.doc.current_user_id = None;
        self.storage.save_data(DocumentPatch::current_user(None));
    }

    // -----------------------------------------------------------------------
    // Persistence helpers
    // -----------------------------------------------------------------------

    fn persist_missions(&self) {
        self.storage
            .save_data(DocumentPatch::missions(self.doc.missions.clone()));
    }

    fn persist_notifications(&self) {
        self.storage
            .save_data(DocumentPatch::notifications(self.doc.notifications_by_user.clone()));
    }

    fn persist_teams(&self) {
        self.storage
            .save_data(DocumentPatch::teams(self.doc.teams.clone()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
