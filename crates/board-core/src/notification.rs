use crate::mission::Mission;
use crate::types::NotificationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stored notifications per user are capped to this many, newest first.
pub const MAX_PER_USER: usize = 100;

/// A repeat of the newest (kind, message) within this window refreshes its
/// timestamp instead of inserting a duplicate.
pub const DEDUP_WINDOW_MS: i64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Per-user ordered notification lists, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationLog(pub BTreeMap<String, Vec<Notification>>);

impl NotificationLog {
    /// Add a notification for `user_id` at an explicit instant.
    ///
    /// If the newest entry for that user has the same kind and message and is
    /// younger than [`DEDUP_WINDOW_MS`], its timestamp is refreshed in place
    /// rather than inserting a duplicate.
    pub fn add_at(
        &mut self,
        user_id: &str,
        kind: NotificationKind,
        message: &str,
        now: DateTime<Utc>,
    ) -> Notification {
        let list = self.0.entry(user_id.to_string()).or_default();

        if let Some(recent) = list.first_mut() {
            if recent.kind == kind
                && recent.message == message
                && (now - recent.timestamp).num_milliseconds() < DEDUP_WINDOW_MS
            {
                recent.timestamp = now;
                return recent.clone();
            }
        }

        let notif = Notification {
            id: Uuid::new_v4().to_string(),
            kind,
            message: message.to_string(),
            timestamp: now,
            read: false,
        };
        list.insert(0, notif.clone());
        list.truncate(MAX_PER_USER);
        notif
    }

    pub fn add(&mut self, user_id: &str, kind: NotificationKind, message: &str) -> Notification {
        self.add_at(user_id, kind, message, Utc::now())
    }

    /// Mark one notification as read. Returns false if it doesn't exist.
    pub fn mark_as_read(&mut self, user_id: &str, notif_id: &str) -> bool {
        let Some(list) = self.0.get_mut(user_id) else {
            return false;
        };
        match list.iter_mut().find(|n| n.id == notif_id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn for_user(&self, user_id: &str, only_unread: bool) -> Vec<Notification> {
        let list = self.0.get(user_id).map(|v| v.as_slice()).unwrap_or(&[]);
        list.iter()
            .filter(|n| !only_unread || !n.read)
            .cloned()
            .collect()
    }

    /// Wholesale delete of one user's notifications.
    pub fn clear(&mut self, user_id: &str) {
        self.0.remove(user_id);
    }
}

/// Compose the user-facing message for a mission event.
pub fn mission_update_message(mission: &Mission) -> String {
    if mission.completed {
        format!("Mission \"{}\" completed!", mission.title)
    } else {
        format!(
            "Progress updated for mission \"{}\" ({}%).",
            mission.title, mission.progress
        )
    }
}

pub fn badge_unlocked_message(badge: &str) -> String {
    format!("Badge unlocked: {badge}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn repeat_within_window_refreshes_timestamp() {
        let mut log = NotificationLog::default();
        let t0 = Utc::now();
        log.add_at("u1", NotificationKind::Mission, "Mission \"X\" completed!", t0);
        let t1 = t0 + Duration::seconds(1);
        log.add_at("u1", NotificationKind::Mission, "Mission \"X\" completed!", t1);

        let notifs = log.for_user("u1", false);
        assert_eq!(notifs.len(), 1);
        assert_eq!(notifs[0].timestamp, t1);
    }

    #[test]
    fn repeat_after_window_inserts_new_entry() {
        let mut log = NotificationLog::default();
        let t0 = Utc::now();
        log.add_at("u1", NotificationKind::Mission, "done", t0);
        log.add_at("u1", NotificationKind::Mission, "done", t0 + Duration::seconds(1));
        log.add_at("u1", NotificationKind::Mission, "done", t0 + Duration::seconds(31));

        assert_eq!(log.for_user("u1", false).len(), 2);
    }

    #[test]
    fn different_message_is_not_deduped() {
        let mut log = NotificationLog::default();
        let t0 = Utc::now();
        log.add_at("u1", NotificationKind::Mission, "one", t0);
        log.add_at("u1", NotificationKind::Mission, "two", t0);
        assert_eq!(log.for_user("u1", false).len(), 2);
    }

    #[test]
    fn list_is_capped_at_100() {
        let mut log = NotificationLog::default();
        let t0 = Utc::now();
        for i in 0..150 {
            log.add_at(
                "u1",
                NotificationKind::Generic,
                &format!("msg {i}"),
                t0 + Duration::seconds(60 * i),
            );
        }
        let notifs = log.for_user("u1", false);
        assert_eq!(notifs.len(), MAX_PER_USER);
        // Newest first; oldest entries were dropped.
        assert_eq!(notifs[0].message, "msg 149");
        assert_eq!(notifs.last().unwrap().message, "msg 50");
    }

    #[test]
    fn mark_as_read_and_unread_filter() {
        let mut log = NotificationLog::default();
        let n = log.add("u1", NotificationKind::Generic, "hello");
        log.add("u1", NotificationKind::Generic, "world");

        assert!(log.mark_as_read("u1", &n.id));
        assert_eq!(log.for_user("u1", true).len(), 1);
        assert_eq!(log.for_user("u1", false).len(), 2);
        assert!(!log.mark_as_read("u1", "nope"));
        assert!(!log.mark_as_read("u2", &n.id));
    }

    #[test]
    fn clear_removes_all_for_user_only() {
        let mut log = NotificationLog::default();
        log.add("u1", NotificationKind::Generic, "a");
        log.add("u2", NotificationKind::Generic, "b");
        log.clear("u1");
        assert!(log.for_user("u1", false).is_empty());
        assert_eq!(log.for_user("u2", false).len(), 1);
    }
}
