use super::{flush_mirror, open_board, OwnerArgs};
use crate::output::{print_json, print_table};
use anyhow::Context;
use board_core::mission::{Mission, MissionFilter, MissionUpdate, NewMission};
use board_core::types::{Category, Priority, Recurrence};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum MissionSubcommand {
    /// Add a mission
    Add {
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        points: Option<u32>,
        #[arg(long)]
        priority: Option<Priority>,
        /// daily, weekly or custom
        #[arg(long)]
        recurrence: Option<Recurrence>,
        /// Interval in days for custom recurrence
        #[arg(long)]
        interval: Option<u32>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// List missions
    List {
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Filter by tag (case-insensitive substring)
        #[arg(long)]
        tag: Option<String>,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Toggle completion (recurring missions roll over to their next due date)
    Toggle {
        id: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Increase progress by a percentage amount
    Progress {
        id: String,
        amount: u32,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Edit mission fields
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        points: Option<u32>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Comma-separated tags (replaces the existing set)
        #[arg(long)]
        tags: Option<String>,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Remove a mission
    Remove {
        id: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Collapse duplicate mission titles, keeping the newest of each
    Dedupe {
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

pub fn run(root: &Path, subcmd: MissionSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MissionSubcommand::Add {
            title,
            description,
            category,
            points,
            priority,
            recurrence,
            interval,
            tags,
            owner,
        } => add(
            root,
            &title.join(" "),
            description,
            category,
            points,
            priority,
            recurrence,
            interval,
            tags,
            &owner,
            json,
        ),
        MissionSubcommand::List {
            category,
            priority,
            tag,
            owner,
        } => list(root, category, priority, tag, &owner, json),
        MissionSubcommand::Toggle { id, owner } => toggle(root, &id, &owner, json),
        MissionSubcommand::Progress { id, amount, owner } => {
            progress(root, &id, amount, &owner, json)
        }
        MissionSubcommand::Edit {
            id,
            title,
            description,
            category,
            points,
            priority,
            tags,
            owner,
        } => edit(
            root,
            &id,
            title,
            description,
            category,
            points,
            priority,
            tags,
            &owner,
            json,
        ),
        MissionSubcommand::Remove { id, owner } => remove(root, &id, &owner, json),
        MissionSubcommand::Dedupe { owner } => dedupe(root, &owner, json),
    }
}

fn split_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn add(
    root: &Path,
    title: &str,
    description: Option<String>,
    category: Option<Category>,
    points: Option<u32>,
    priority: Option<Priority>,
    recurrence: Option<Recurrence>,
    interval: Option<u32>,
    tags: Option<String>,
    owner: &OwnerArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let owner = owner.resolve(&board)?;

    let mut new = NewMission::new(owner).title(title);
    if let Some(d) = description {
        new.description = d;
    }
    if let Some(c) = category {
        new.category = c;
    }
    if let Some(p) = points {
        new = new.points(p);
    }
    if let Some(p) = priority {
        new.priority = p;
    }
    if let Some(r) = recurrence {
        new = new.recurrence(r);
    }
    if let Some(i) = interval {
        new.custom_interval = i;
    }
    new.tags = split_tags(tags);

    let mission = board.add_mission(new);
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&mission)?;
    } else {
        println!("Added mission [{}]: {}", mission.id, mission.title);
    }
    Ok(())
}

fn list(
    root: &Path,
    category: Option<Category>,
    priority: Option<Priority>,
    tag: Option<String>,
    owner: &OwnerArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (_cfg, board) = open_board(root)?;
    let owner = owner.resolve(&board)?;
    let filter = MissionFilter {
        category,
        priority,
        tag,
    };
    let missions = board.missions_for(&owner, &filter);

    if json {
        print_json(&missions)?;
        return Ok(());
    }

    if missions.is_empty() {
        println!("No missions for {owner}.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = missions.iter().map(mission_row).collect();
    print_table(
        &["ID", "TITLE", "CATEGORY", "PRIORITY", "PROGRESS", "DONE", "POINTS"],
        rows,
    );
    Ok(())
}

fn mission_row(m: &Mission) -> Vec<String> {
    vec![
        m.id.clone(),
        m.title.clone(),
        m.category.to_string(),
        m.priority.to_string(),
        format!("{}%", m.progress),
        if m.completed { "yes" } else { "no" }.to_string(),
        m.points.to_string(),
    ]
}

fn toggle(root: &Path, id: &str, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let owner = owner.resolve(&board)?;
    // A recurring mission that just completed rolls straight back to
    // incomplete, so the final state alone cannot tell a completion from a
    // reopen; remember where it started.
    let was_completed = board
        .mission(id, &owner)
        .map(|m| m.completed)
        .with_context(|| format!("mission '{id}' not found for {owner}"))?;
    let mission = board
        .toggle_mission(id, &owner)
        .with_context(|| format!("mission '{id}' not found for {owner}"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&mission)?;
    } else if was_completed {
        println!("Reopened [{}]: {}", mission.id, mission.title);
    } else if mission.completed {
        println!("Completed [{}]: {} (+{} pts)", mission.id, mission.title, mission.points);
    } else {
        let due = mission
            .next_due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "Completed [{}]: {} (+{} pts), due again {}",
            mission.id, mission.title, mission.points, due
        );
    }
    Ok(())
}

fn progress(root: &Path, id: &str, amount: u32, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let owner = owner.resolve(&board)?;
    let mission = board
        .increase_progress(id, &owner, amount)
        .with_context(|| format!("mission '{id}' not found for {owner}"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&mission)?;
    } else if mission.completed {
        println!("Completed [{}]: {} at 100%", mission.id, mission.title);
    } else {
        println!("[{}] {} at {}%", mission.id, mission.title, mission.progress);
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn edit(
    root: &Path,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    category: Option<Category>,
    points: Option<u32>,
    priority: Option<Priority>,
    tags: Option<String>,
    owner: &OwnerArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let owner = owner.resolve(&board)?;

    let update = MissionUpdate {
        title,
        description,
        category,
        points,
        priority,
        tags: tags.map(|t| split_tags(Some(t))),
        ..Default::default()
    };
    let mission = board
        .update_mission(id, &owner, &update)
        .with_context(|| format!("mission '{id}' not found for {owner}"))?;
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&mission)?;
    } else {
        println!("Updated mission [{}]", mission.id);
    }
    Ok(())
}

fn remove(root: &Path, id: &str, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let owner = owner.resolve(&board)?;
    if !board.remove_mission(id, &owner) {
        anyhow::bail!("mission '{id}' not found for {owner}");
    }
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&serde_json::json!({ "id": id, "removed": true }))?;
    } else {
        println!("Removed mission [{id}]");
    }
    Ok(())
}

fn dedupe(root: &Path, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let owner = owner.resolve(&board)?;
    let kept = board.dedupe_missions_for(&owner);
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&kept)?;
    } else {
        println!("Kept {} missions for {owner}", kept.len());
    }
    Ok(())
}
