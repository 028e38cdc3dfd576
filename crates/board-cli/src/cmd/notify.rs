use super::{flush_mirror, open_board, OwnerArgs};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum NotifySubcommand {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Mark a notification as read
    Read {
        id: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Clear all notifications for a user
    Clear {
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

pub fn run(root: &Path, subcmd: NotifySubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        NotifySubcommand::List { unread, owner } => list(root, unread, &owner, json),
        NotifySubcommand::Read { id, owner } => read(root, &id, &owner, json),
        NotifySubcommand::Clear { owner } => clear(root, &owner, json),
    }
}

fn list(root: &Path, unread: bool, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (_cfg, board) = open_board(root)?;
    let user = owner.resolve_user(&board)?;
    let notifications = board.notifications(&user, unread);

    if json {
        print_json(&notifications)?;
        return Ok(());
    }

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = notifications
        .iter()
        .map(|n| {
            vec![
                n.id.clone(),
                n.kind.to_string(),
                if n.read { "read" } else { "unread" }.to_string(),
                n.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                n.message.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "TYPE", "STATE", "WHEN", "MESSAGE"], rows);
    Ok(())
}

fn read(root: &Path, id: &str, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let user = owner.resolve_user(&board)?;
    if !board.mark_notification_read(&user, id) {
        anyhow::bail!("notification '{id}' not found for user '{user}'");
    }
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&serde_json::json!({ "id": id, "read": true }))?;
    } else {
        println!("Marked [{id}] as read");
    }
    Ok(())
}

fn clear(root: &Path, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let user = owner.resolve_user(&board)?;
    board.clear_notifications(&user);
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&serde_json::json!({ "user": user, "cleared": true }))?;
    } else {
        println!("Cleared notifications for '{user}'");
    }
    Ok(())
}
