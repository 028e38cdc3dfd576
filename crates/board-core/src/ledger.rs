use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const BADGE_ROOKIE: &str = "Rookie";
pub const BADGE_PRO: &str = "Pro";
pub const BADGE_WEEK_STREAK: &str = "One Week Streak";
pub const BADGE_MONTHLY_MASTER: &str = "Monthly Master";

/// Points, level, streak and badges for one owner.
///
/// The board keys ledgers by owner id (see `Document::achievements`), so a
/// user's completions never credit anyone else's streak.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ledger {
    pub points: u32,
    pub level: u32,
    pub streak: u32,
    pub last_completed_date: Option<NaiveDate>,
    pub badges: Vec<String>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            points: 0,
            level: 1,
            streak: 0,
            last_completed_date: None,
            badges: Vec::new(),
        }
    }
}

fn level_for(points: u32) -> u32 {
    points / 100 + 1
}

impl Ledger {
    /// Add points and recompute the level (every 100 points is a level).
    pub fn award_points(&mut self, amount: u32) {
        self.points += amount;
        self.level = level_for(self.points);
    }

    /// Advance the streak for a completion on `today`.
    ///
    /// Same calendar day twice is a no-op; a completion the day after the
    /// last one extends the streak; anything else resets it to 1.
    pub fn update_streak_on(&mut self, today: NaiveDate) {
        if self.last_completed_date == Some(today) {
            return;
        }
        if self.last_completed_date.is_some() && self.last_completed_date == today.pred_opt() {
            self.streak += 1;
        } else {
            self.streak = 1;
        }
        self.last_completed_date = Some(today);
    }

    /// Streak update using the local calendar day.
    pub fn update_streak(&mut self) {
        self.update_streak_on(chrono::Local::now().date_naive());
    }

    /// Unlock any badges whose thresholds are now met. Badges are never
    /// removed, even if points or streak later regress. Returns the badges
    /// unlocked by this call so callers can fan out notifications.
    pub fn check_badges(&mut self) -> Vec<String> {
        let mut earned: Vec<&str> = Vec::new();
        if self.points >= 100 {
            earned.push(BADGE_ROOKIE);
        }
        if self.points >= 500 {
            earned.push(BADGE_PRO);
        }
        if self.streak >= 7 {
            earned.push(BADGE_WEEK_STREAK);
        }
        if self.streak >= 30 {
            earned.push(BADGE_MONTHLY_MASTER);
        }

        let mut unlocked = Vec::new();
        for badge in earned {
            if !self.badges.iter().any(|b| b == badge) {
                self.badges.push(badge.to_string());
                unlocked.push(badge.to_string());
            }
        }
        unlocked
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
