//! Project config loading shared by every subcommand.

use std::path::{Path, PathBuf};

use hsmap_recon::ReconConfig;

use crate::exit_codes::EXIT_CONFIG_INVALID;
use crate::CliError;

pub struct Project {
    pub config: ReconConfig,
    /// Directory relative table paths resolve against.
    pub base_dir: PathBuf,
}

pub fn load_project(config_path: &Path) -> Result<Project, CliError> {
    let text = std::fs::read_to_string(config_path).map_err(|e| CliError {
        code: EXIT_CONFIG_INVALID,
        message: format!("cannot read config {}: {e}", config_path.display()),
        hint: None,
    })?;

    let config = ReconConfig::from_toml(&text).map_err(|e| CliError {
        code: EXIT_CONFIG_INVALID,
        message: e.to_string(),
        hint: Some("run `hsmap validate <config>` for details".into()),
    })?;

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(Project { config, base_dir })
}
