use super::{flush_mirror, open_board};
use crate::output::{print_json, print_table};
use board_core::profile::{LeaderboardMetric, ProfileUpdate};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Create a profile (email must be unique)
    Create {
        name: String,
        email: String,
        /// Opaque id from the external identity provider
        #[arg(long)]
        auth_id: Option<String>,
    },
    /// Update profile fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        auth_id: Option<String>,
    },
    /// List profiles
    List,
    /// Rank profiles by an achievement metric
    Leaderboard {
        /// points, streak or badges
        #[arg(long, default_value = "points")]
        by: LeaderboardMetric,
    },
}

pub fn run(root: &Path, subcmd: ProfileSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ProfileSubcommand::Create {
            name,
            email,
            auth_id,
        } => create(root, &name, &email, auth_id, json),
        ProfileSubcommand::Update {
            id,
            name,
            email,
            auth_id,
        } => update(root, &id, name, email, auth_id, json),
        ProfileSubcommand::List => list(root, json),
        ProfileSubcommand::Leaderboard { by } => leaderboard(root, by, json),
    }
}

fn create(
    root: &Path,
    name: &str,
    email: &str,
    auth_id: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let profile = board.create_profile(name, email, auth_id)?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&profile)?;
    } else {
        println!("Created profile [{}]: {} <{}>", profile.id, profile.name, profile.email);
    }
    Ok(())
}

fn update(
    root: &Path,
    id: &str,
    name: Option<String>,
    email: Option<String>,
    auth_id: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let update = ProfileUpdate {
        name,
        email,
        external_auth_id: auth_id.map(Some),
    };
    let profile = board
        .update_profile(id, &update)?
        .ok_or_else(|| anyhow::anyhow!("profile '{id}' not found"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&profile)?;
    } else {
        println!("Updated profile [{}]", profile.id);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_cfg, board) = open_board(root)?;
    let profiles = board.profiles();

    if json {
        print_json(&profiles)?;
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = profiles
        .iter()
        .map(|p| {
            let ledger = board.ledger(&p.id);
            vec![
                p.id.clone(),
                p.name.clone(),
                p.email.clone(),
                ledger.points.to_string(),
                ledger.level.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "EMAIL", "POINTS", "LEVEL"], rows);
    Ok(())
}

fn leaderboard(root: &Path, by: LeaderboardMetric, json: bool) -> anyhow::Result<()> {
    let (_cfg, board) = open_board(root)?;
    let entries = board.leaderboard(by);

    if json {
        print_json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        println!("No profiles yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            vec![
                (i + 1).to_string(),
                e.name.clone(),
                e.value.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "NAME", "VALUE"], rows);
    Ok(())
}
