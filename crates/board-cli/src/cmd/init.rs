use board_core::config::{board_dir, Config};
use board_core::document::Document;
use std::path::Path;

/// Initialize a mission board in `root`: write `.board/config.yaml` and an
/// empty data file. Re-running on an initialized project is an error so an
/// existing board is never clobbered.
pub fn run(root: &Path, remote: Option<&str>, port: Option<u16>) -> anyhow::Result<()> {
    if Config::load(root).is_ok() {
        anyhow::bail!("already initialized: {} exists", board_dir(root).display());
    }

    let mut cfg = Config::default();
    cfg.remote_url = remote.map(|u| u.trim_end_matches('/').to_string());
    if let Some(p) = port {
        cfg.port = p;
    }
    cfg.save(root)?;

    let data_path = cfg.data_path(root);
    if !data_path.exists() {
        let data = serde_json::to_vec_pretty(&Document::default())?;
        board_core::io::atomic_write(&data_path, &data)?;
    }

    println!("Initialized mission board in {}", board_dir(root).display());
    if let Some(url) = &cfg.remote_url {
        println!("Mirroring to {url}");
    }
    Ok(())
}
