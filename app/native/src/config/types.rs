//! Configuration types and loading for Tether.
//!
//! The file is JSONC: `//` and `/* */` comments are stripped before parsing.
//! Every section is optional; omitted fields fall back to their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache;
use crate::constants::APP_NAME;
use crate::modules::bridge::DEFAULT_RECENT_EVENTS_LIMIT;
use crate::modules::layout::{LayoutStyle, ScreenRect};
use crate::platform::path::expand;

/// Configuration file names, in lookup order.
const CONFIG_FILE_NAMES: [&str; 2] = ["config.jsonc", "config.json"];

/// Legacy dotfile names in the home directory.
const LEGACY_CONFIG_FILE_NAMES: [&str; 2] = [".tether.jsonc", ".tether.json"];

/// Errors that can occur when loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error("No configuration file found")]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TetherConfig {
    /// Socket and event store settings.
    pub bridge: BridgeConfig,
    /// Colors and spacing used when arranging windows.
    pub layout: LayoutConfig,
    /// Additions to the built-in sensitive window tables.
    pub security: SecurityConfig,
    /// Settings for the in-memory window host.
    pub host: HostConfig,
}

/// Bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Path of the Unix socket. Defaults to the cache directory.
    /// Supports `~` expansion.
    pub socket_path: Option<String>,
    /// Path of the JSONL event store. Defaults to the cache directory.
    pub event_log: Option<String>,
    /// Upper bound for `get_recent_events`.
    pub recent_events_limit: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            event_log: None,
            recent_events_limit: DEFAULT_RECENT_EVENTS_LIMIT,
        }
    }
}

impl BridgeConfig {
    /// Resolved socket path.
    #[must_use]
    pub fn socket_path(&self) -> PathBuf {
        resolve_or(self.socket_path.as_deref(), cache::default_socket_path)
    }

    /// Resolved event store path.
    #[must_use]
    pub fn event_log_path(&self) -> PathBuf {
        resolve_or(self.event_log.as_deref(), cache::default_event_log_path)
    }
}

fn resolve_or(value: Option<&str>, fallback: impl FnOnce() -> PathBuf) -> PathBuf {
    match value.map(expand) {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => fallback(),
    }
}

/// Layout colors and spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Border color of the focused window.
    pub border_focus: String,
    /// Border color of unfocused windows.
    pub border_normal: String,
    /// Border width in pixels.
    pub border_width: i32,
    /// Margin around each window in pixels.
    pub margin: i32,
    /// Fill color of proposed slots.
    pub ghost_color: String,
    /// Fill color of proposed slots that overlap another proposed slot.
    pub conflict_color: String,
    /// Minimum width of the area left for unslotted windows.
    pub min_tile_width: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let style = LayoutStyle::default();
        Self {
            border_focus: style.border_focus,
            border_normal: style.border_normal,
            border_width: style.border_width,
            margin: style.margin,
            ghost_color: style.ghost_color,
            conflict_color: style.conflict_color,
            min_tile_width: style.min_tile_width,
        }
    }
}

impl From<&LayoutConfig> for LayoutStyle {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            border_focus: config.border_focus.clone(),
            border_normal: config.border_normal.clone(),
            border_width: config.border_width.max(0),
            margin: config.margin.max(0),
            ghost_color: config.ghost_color.clone(),
            conflict_color: config.conflict_color.clone(),
            min_tile_width: config.min_tile_width.max(0),
        }
    }
}

/// Extra sensitive window rules. These extend the built-in tables and can
/// never shrink them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityConfig {
    /// Additional window classes (case-insensitive, exact match).
    pub extra_sensitive_classes: Vec<String>,
    /// Additional window title substrings (case-insensitive).
    pub extra_sensitive_titles: Vec<String>,
}

/// In-memory host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    /// Screen rectangle in pixels.
    pub screen: ScreenRect,
    /// Group names. The first one is shown at startup.
    pub groups: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            screen: ScreenRect::new(0, 0, 1920, 1080),
            groups: vec!["a".to_string(), "b".to_string()],
        }
    }
}

/// Returns the candidate configuration file paths, in priority order.
///
/// 1. `$XDG_CONFIG_HOME/tether/config.{jsonc,json}` when the variable is set
/// 2. `~/.config/tether/config.{jsonc,json}`
/// 3. the platform config directory
/// 4. `~/.tether.{jsonc,json}`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(&PathBuf::from(xdg_config).join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(&home.join(".config").join(APP_NAME), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(&config_dir.join(APP_NAME), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

fn push_dir(dir: &Path, paths: &mut Vec<PathBuf>) {
    for filename in CONFIG_FILE_NAMES {
        let path = dir.join(filename);
        // XDG_CONFIG_HOME is often ~/.config
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
}

/// Loads the configuration from the first existing file in [`config_paths`].
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no file exists, or the read/parse error
/// of the first file that does.
pub fn load_config() -> Result<(TetherConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), load_config_from_path)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, otherwise the
/// read or parse error.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<(TetherConfig, PathBuf), ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: TetherConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
