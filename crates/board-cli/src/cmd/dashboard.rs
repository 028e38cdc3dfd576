use super::{flush_mirror, open_board, OwnerArgs};
use crate::output::print_json;
use std::path::Path;

/// Assemble and print the user dashboard. Assembly dedupes mission titles,
/// so the board is persisted afterwards.
pub fn run(root: &Path, owner: &OwnerArgs, json: bool) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let user = owner.resolve_user(&board)?;
    let dash = board.prepare_user_dashboard(&user);
    flush_mirror(&cfg, &mut board);

    if json {
        print_json(&dash)?;
        return Ok(());
    }

    match &dash.profile {
        Some(p) => println!("Dashboard for {} <{}>", p.name, p.email),
        None => println!("Dashboard for {user}"),
    }
    println!(
        "Level {} | {} pts | {}-day streak | badges: {}",
        dash.achievements.level,
        dash.achievements.points,
        dash.achievements.streak,
        if dash.achievements.badges.is_empty() {
            "none".to_string()
        } else {
            dash.achievements.badges.join(", ")
        }
    );

    let open = dash.missions.iter().filter(|m| !m.completed).count();
    println!("Missions: {} open / {} total", open, dash.missions.len());
    for m in &dash.missions {
        let mark = if m.completed { "x" } else { " " };
        println!("  [{mark}] {} ({}%, {} pts)", m.title, m.progress, m.points);
    }

    if !dash.teams.is_empty() {
        println!("Teams:");
        for t in &dash.teams {
            let members: Vec<String> = t.members.iter().map(|m| m.name.clone()).collect();
            println!("  {} — {}", t.name, members.join(", "));
        }
    }

    let unread = dash.notifications.iter().filter(|n| !n.read).count();
    println!("Notifications: {} unread / {} total", unread, dash.notifications.len());
    Ok(())
}
