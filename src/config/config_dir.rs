use std::path::PathBuf;

use tracing::debug;

use super::error::{ConfigError, ConfigResult};

static CONFIG_FILE: &str = "config.toml";

/// Resolves `config.toml`: the working directory for local runs, otherwise
/// the per-user config dir (`~/.config/coursebay` or `%APPDATA%\coursebay`),
/// falling back to the working directory.
pub fn find_config_file(use_local: bool) -> PathBuf {
    let local = PathBuf::from(".").join(CONFIG_FILE);
    if use_local {
        return local;
    }

    #[cfg(unix)]
    let path = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"));
    #[cfg(windows)]
    let path = std::env::var_os("APPDATA").map(PathBuf::from);
    #[cfg(not(any(unix, windows)))]
    let path: Option<PathBuf> = None;

    path.map(|dir| dir.join(crate::APPLICATION_NAME).join(CONFIG_FILE))
        .filter(|candidate| candidate.exists())
        .unwrap_or(local)
}

pub fn read_config(use_local: bool) -> ConfigResult<Vec<u8>> {
    let filename = find_config_file(use_local);

    tracing::trace!("looking for config at: {}", filename.display());
    if !filename.exists() {
        return Err(ConfigError::ConfigNotFound);
    }

    let filename = filename.canonicalize()?;
    debug!("using {} as configuration file", filename.display());

    Ok(std::fs::read(filename)?)
}
