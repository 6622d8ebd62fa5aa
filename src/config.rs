// Runtime settings: where the relay lives and where the key file is kept.
// Built once in `main` and handed to the collaborators that need it.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "teleput_cli";
pub const SERVER: &str = "https://teleput.textual.ru";
pub const BOT_URL: &str = "https://t.me/teleput_bot";

/// Overrides the relay base URL.
pub const SERVER_ENV: &str = "TELEPUT_SERVER";
/// Overrides the directory holding the key file.
pub const CONFIG_DIR_ENV: &str = "TELEPUT_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: String,
    pub config_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from `TELEPUT_SERVER` / `TELEPUT_CONFIG_DIR`, falling
    /// back to the public relay and `<user-config-dir>/teleput_cli`.
    pub fn from_env() -> Result<Self> {
        let server = std::env::var(SERVER_ENV).unwrap_or_else(|_| SERVER.into());
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|path| path.join(APP_NAME))
                .context("Could not determine the user config directory")?,
        };
        Ok(Settings {
            server: server.trim_end_matches('/').to_string(),
            config_dir,
        })
    }
}
