use super::{flush_mirror, open_board};
use anyhow::Context;
use std::path::Path;

/// `mboard use <profile-id>` — select the signed-in user.
pub fn use_profile(root: &Path, profile_id: &str) -> anyhow::Result<()> {
    let (cfg, mut board) = open_board(root)?;
    let profile = board
        .profile(profile_id)
        .with_context(|| format!("profile '{profile_id}' not found"))?
        .clone();

    board.set_current_user(profile.id.clone());
    flush_mirror(&cfg, &mut board);
    println!("Now acting as {} <{}>", profile.name, profile.email);
    Ok(())
}

/// `mboard whoami` — show the signed-in user.
pub fn whoami(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_cfg, board) = open_board(root)?;
    match board.current_user() {
        Some(id) => {
            let profile = board.profile(id).cloned();
            if json {
                crate::output::print_json(&serde_json::json!({
                    "currentUserId": id,
                    "profile": profile,
                }))?;
            } else {
                match profile {
                    Some(p) => println!("{} <{}> ({})", p.name, p.email, p.id),
                    None => println!("{id} (no matching profile)"),
                }
            }
        }
        None => {
            if json {
                crate::output::print_json(&serde_json::json!({ "currentUserId": null }))?;
            } else {
                println!("No user selected. Run 'mboard use <profile-id>'.");
            }
        }
    }
    Ok(())
}
