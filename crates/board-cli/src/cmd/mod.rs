pub mod dashboard;
pub mod init;
pub mod mission;
pub mod notify;
pub mod profile;
pub mod serve;
pub mod sync;
pub mod team;
pub mod user;

use anyhow::Context;
use board_core::config::Config;
use board_core::storage::MirrorEvent;
use board_core::types::Owner;
use board_core::Board;
use std::path::Path;
use std::time::Duration;

/// Open the board for this project root.
pub fn open_board(root: &Path) -> anyhow::Result<(Config, Board)> {
    let cfg = Config::load(root)?;
    let board = Board::open(cfg.storage(root));
    Ok((cfg, board))
}

/// Wait for pending mirror posts before the process exits, so writes to the
/// dev server are not lost. No-op without a remote. Failures are logged,
/// never fatal.
pub fn flush_mirror(cfg: &Config, board: &mut Board) {
    if cfg.remote_url.is_none() {
        return;
    }
    let Some(rx) = board.mirror_events() else {
        return;
    };
    let mut timeout = Duration::from_secs(5);
    while let Ok(event) = rx.recv_timeout(timeout) {
        timeout = Duration::from_millis(250);
        if let MirrorEvent::Failed { endpoint, error } = event {
            tracing::warn!(%endpoint, %error, "mirror write failed");
        }
    }
}

/// Owner selector shared by mission commands: `--user <ID>` or `--team <ID>`,
/// defaulting to the signed-in user.
#[derive(clap::Args)]
pub struct OwnerArgs {
    /// Act as this user id
    #[arg(long, conflicts_with = "team")]
    pub user: Option<String>,

    /// Act as this team id
    #[arg(long)]
    pub team: Option<String>,
}

impl OwnerArgs {
    pub fn resolve(&self, board: &Board) -> anyhow::Result<Owner> {
        if let Some(id) = &self.user {
            return Ok(Owner::user(id.clone()));
        }
        if let Some(id) = &self.team {
            return Ok(Owner::team(id.clone()));
        }
        let current = board
            .current_user()
            .context("no user selected: pass --user/--team or run 'mboard use <profile-id>'")?;
        Ok(Owner::user(current.to_string()))
    }

    /// Like `resolve` but users only, for notification and dashboard scopes.
    pub fn resolve_user(&self, board: &Board) -> anyhow::Result<String> {
        if let Some(id) = &self.user {
            return Ok(id.clone());
        }
        let current = board
            .current_user()
            .context("no user selected: pass --user or run 'mboard use <profile-id>'")?;
        Ok(current.to_string())
    }
}
