use crate::output::print_json;
use board_core::config::Config;
use std::path::Path;

/// Pull the authoritative document from the remote and overwrite the local
/// cache. Without a remote this just reports the local state.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load(root)?;
    let storage = cfg.storage(root);
    let doc = storage.sync_remote_data();

    if json {
        print_json(&doc)?;
        return Ok(());
    }

    match &cfg.remote_url {
        Some(url) => println!("Synced from {url}"),
        None => println!("No remote configured; showing local data"),
    }
    println!(
        "{} missions, {} profiles, {} teams",
        doc.missions.len(),
        doc.profiles.len(),
        doc.teams.len()
    );
    Ok(())
}
