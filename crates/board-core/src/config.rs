use crate::error::{BoardError, Result};
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BOARD_DIR: &str = ".board";
pub const CONFIG_FILE: &str = ".board/config.yaml";
pub const DATA_FILE: &str = ".board/data.json";

pub fn board_dir(root: &Path) -> PathBuf {
    root.join(BOARD_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Data file path, relative to the project root.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Base URL of the dev data server, e.g. "http://localhost:4000".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_version() -> u32 {
    1
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DATA_FILE)
}

fn default_port() -> u16 {
    4000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            data_file: default_data_file(),
            remote_url: None,
            port: default_port(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = config_path(root);
        if !path.exists() {
            return Err(BoardError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn data_path(&self, root: &Path) -> PathBuf {
        root.join(&self.data_file)
    }

    /// Build the persistence handle this config describes.
    pub fn storage(&self, root: &Path) -> Storage {
        Storage::new(self.data_path(root), self.remote_url.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.remote_url = Some("http://localhost:4000".to_string());
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.port, 4000);
        assert_eq!(loaded.remote_url.as_deref(), Some("http://localhost:4000"));
        assert_eq!(loaded.data_path(dir.path()), dir.path().join(DATA_FILE));
    }

    #[test]
    fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(BoardError::NotInitialized)
        ));
    }

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("version: 1\n").unwrap();
        assert_eq!(cfg.port, 4000);
        assert!(cfg.remote_url.is_none());

        // remote_url is not emitted when unset.
        let out = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(!out.contains("remote_url"));
    }
}
