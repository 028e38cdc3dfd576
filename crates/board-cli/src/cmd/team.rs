use super::{flush_mirror, open_board};
use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum TeamSubcommand {
    /// Create a team
    Create {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Add a profile to a team
    AddMember { team_id: String, profile_id: String },
    /// Remove a profile from a team
    RemoveMember { team_id: String, profile_id: String },
    /// Assign a mission to a team
    Assign { team_id: String, mission_id: String },
    /// List teams with resolved members
    List,
}

pub fn run(root: &Path, subcmd: TeamSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TeamSubcommand::Create { name } => create(root, &name.join(" "), json),
        TeamSubcommand::AddMember {
            team_id,
            profile_id,
        } => add_member(root, &team_id, &profile_id, json),
        TeamSubcommand::RemoveMember {
            team_id,
            profile_id,
        } => remove_member(root, &team_id, &profile_id, json),
        TeamSubcommand::Assign {
            team_id,
            mission_id,
        } => assign(root, &team_id, &mission_id, json),
        TeamSubcommand::List => list(root, json),
    }
}

fn create(root: &Path, name: &str, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let team = board.create_team(name);
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&team)?;
    } else {
        println!("Created team [{}]: {}", team.id, team.name);
    }
    Ok(())
}

fn add_member(root: &Path, team_id: &str, profile_id: &str, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let team = board
        .add_team_member(team_id, profile_id)
        .with_context(|| format!("team '{team_id}' or profile '{profile_id}' not found"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&team)?;
    } else {
        println!("Added {} to team '{}'", profile_id, team.name);
    }
    Ok(())
}

fn remove_member(root: &Path, team_id: &str, profile_id: &str, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let team = board
        .remove_team_member(team_id, profile_id)
        .with_context(|| format!("team '{team_id}' not found"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&team)?;
    } else {
        println!("Removed {} from team '{}'", profile_id, team.name);
    }
    Ok(())
}

fn assign(root: &Path, team_id: &str, mission_id: &str, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let team = board
        .assign_team_mission(team_id, mission_id)
        .with_context(|| format!("team '{team_id}' not found"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&team)?;
    } else {
        println!("Assigned mission {} to team '{}'", mission_id, team.name);
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_cfg, board) = open_board(root)?;
    let teams = board.prepare_teams();

    if json {
        print_json(&teams)?;
        return Ok(());
    }

    if teams.is_empty() {
        println!("No teams yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = teams
        .iter()
        .map(|t| {
            let members: Vec<String> = t.members.iter().map(|m| m.name.clone()).collect();
            vec![
                t.id.clone(),
                t.name.clone(),
                members.join(", "),
                t.missions.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "MEMBERS", "MISSIONS"], rows);
    Ok(())
}
