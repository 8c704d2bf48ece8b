//! Configuration for Replicator.
//!
//! User preferences live in `config.toml` in the data directory:
//!
//! - `output` - "json" or "human"
//! - `[layout]` - layout engine constants (lane sizes, settle and glide)
//! - `[view]` - headless render loop limits
//! - `[plan]` - receptionist plan push settings
//!
//! ## Precedence
//!
//! For output format: CLI flag > config file > JSON default.
//! A missing file means defaults. A file that does not parse is an error.

pub mod schema;

pub use schema::{OutputFormat, PlanConfig, ReplicatorConfig, ViewConfig};

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the config file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Load `config.toml` from `data_dir`.
pub fn load_config(data_dir: &Path) -> Result<ReplicatorConfig> {
    let path = config_path(data_dir);
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ReplicatorConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let config: ReplicatorConfig = toml::from_str(&content)?;
    config
        .validate()
        .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Whether to print human-readable output.
pub fn resolve_human(flag: bool, config: &ReplicatorConfig) -> bool {
    flag || config.output == Some(OutputFormat::Human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, ReplicatorConfig::default());
    }

    #[test]
    fn test_loads_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            config_path(dir.path()),
            "output = \"human\"\n[view]\nmax_frames = 50\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.view.max_frames, 50);
        assert!(resolve_human(false, &config));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(config_path(dir.path()), "[layout\nlane_width = ").unwrap();
        assert!(matches!(load_config(dir.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_out_of_range_value_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(config_path(dir.path()), "[layout]\nagents_per_row = 0\n").unwrap();
        assert!(matches!(
            load_config(dir.path()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_flag_wins() {
        let config = ReplicatorConfig::default();
        assert!(!resolve_human(false, &config));
        assert!(resolve_human(true, &config));
    }
}
