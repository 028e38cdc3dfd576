use board_core::config::Config;
use std::path::Path;

/// Run the dev data server backed by this project's data file.
pub fn run(root: &Path, port: Option<u16>) -> anyhow::Result<()> {
    let cfg = Config::load(root)?;
    let port = port.unwrap_or(cfg.port);
    let data_path = cfg.data_path(root);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(board_server::serve(data_path, port))
}
