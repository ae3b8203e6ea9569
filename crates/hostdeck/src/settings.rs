use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

const CONFIG_PATH_ENV: &str = "HOSTDECK_CONFIG_PATH";
const CONFIG_DIR_ENV: &str = "HOSTDECK_CONFIG_DIR";

/// Application settings, stored as JSON next to other per-user config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SSH config to browse instead of `~/.ssh/config`.
    #[serde(default)]
    pub ssh_config_path: Option<PathBuf>,
    /// Shell used to run `ssh`; falls back to `$SHELL`, then `/bin/bash`.
    #[serde(default)]
    pub shell: Option<String>,
    #[serde(default = "default_list_width_percent")]
    pub list_width_percent: u16,
    #[serde(default = "default_true")]
    pub show_help_bar: bool,
}

fn default_list_width_percent() -> u16 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssh_config_path: None,
            shell: None,
            list_width_percent: default_list_width_percent(),
            show_help_bar: true,
        }
    }
}

impl Settings {
    pub async fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path).await,
            None => Ok(Self::default()),
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !try_exists(path).await? {
            log::info!("Settings file does not exist, creating default");
            let settings = Self::default();
            if let Err(e) = settings.save_to(path).await {
                log::warn!("Failed to write default settings: {}", e);
            }
            return Ok(settings);
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Failed to read settings file: {}", e);
                return Ok(Self::default());
            }
        };

        if content.trim().is_empty() {
            log::warn!("Settings file is empty, using defaults");
            return Ok(Self::default());
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut settings) => {
                settings.validate();
                log::info!("Loaded settings from: {}", path.display());
                Ok(settings)
            }
            Err(json_err) => {
                log::error!("Failed to parse settings file: {}", json_err);

                let backup_path = path.with_extension("bak");
                match tokio::fs::copy(path, &backup_path).await {
                    Ok(_) => log::info!("Backed up broken settings to: {}", backup_path.display()),
                    Err(e) => log::warn!("Failed to back up broken settings: {}", e),
                }
                Ok(Self::default())
            }
        }
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create settings directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        log::info!("Saved settings to: {}", path.display());
        Ok(())
    }

    /// Clamp out-of-range values back to their defaults.
    pub fn validate(&mut self) {
        if !(10..=90).contains(&self.list_width_percent) {
            log::warn!(
                "Invalid list width: {}%, using default",
                self.list_width_percent
            );
            self.list_width_percent = default_list_width_percent();
        }

        if matches!(self.shell.as_deref(), Some(shell) if shell.trim().is_empty()) {
            self.shell = None;
        }
    }

    /// SSH config path: command line first, then settings, then `<home>/.ssh/config`.
    pub fn resolve_ssh_config_path(&self, cli_path: Option<PathBuf>, home: Option<&Path>) -> PathBuf {
        cli_path
            .or_else(|| self.ssh_config_path.clone())
            .unwrap_or_else(|| sshconf::default_config_path(home))
    }

    fn settings_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "hostdeck", "hostdeck")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
