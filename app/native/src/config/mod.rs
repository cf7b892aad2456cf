//! Configuration module for Tether.
//!
//! The configuration is loaded once per process and shared through
//! [`get_config`]. A `--config PATH` given on the command line replaces the
//! default search paths.

pub mod types;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    BridgeConfig, ConfigError, HostConfig, LayoutConfig, SecurityConfig, TetherConfig,
    config_paths, load_config as load_config_default, load_config_from_path,
};

use crate::modules::security::SecurityPolicy;

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<TetherConfig> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// Must be called before [`get_config`] to take effect. Returns `false` if a
/// path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration, honoring the custom path override.
///
/// # Errors
///
/// Returns the underlying [`ConfigError`]; a missing file is reported as
/// `ConfigError::NotFound`.
pub fn try_load() -> Result<(TetherConfig, PathBuf), ConfigError> {
    CUSTOM_CONFIG_PATH.get().map_or_else(load_config_default, load_config_from_path)
}

fn load_or_default() -> TetherConfig {
    match try_load() {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            config
        }
        Err(ConfigError::NotFound) => TetherConfig::default(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            TetherConfig::default()
        }
    }
}

/// Returns the global configuration instance, loading it on first use.
///
/// A missing or invalid file yields the default configuration.
pub fn get_config() -> &'static TetherConfig { CONFIG.get_or_init(load_or_default) }

impl TetherConfig {
    /// Builds the security policy with the configured extra rules.
    #[must_use]
    pub fn security_policy(&self) -> SecurityPolicy {
        SecurityPolicy::with_extra_rules(
            &self.security.extra_sensitive_classes,
            &self.security.extra_sensitive_titles,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::host::WindowSnapshot;

    fn window(name: &str, class: &str) -> WindowSnapshot {
        WindowSnapshot {
            id: 1,
            name: name.to_string(),
            classes: vec![class.to_string()],
            group: None,
            metadata: None,
        }
    }

    #[test]
    fn test_security_policy_includes_extra_rules() {
        let mut config = TetherConfig::default();
        config.security.extra_sensitive_classes.push("Vault".to_string());
        config.security.extra_sensitive_titles.push("payroll".to_string());
        let policy = config.security_policy();

        assert!(!policy.can_see(Some(&window("editor", "vault"))));
        assert!(!policy.can_see(Some(&window("Q3 Payroll.xlsx", "libreoffice"))));
        assert!(policy.can_see(Some(&window("notes", "gedit"))));
    }

    #[test]
    fn test_security_policy_keeps_builtin_rules() {
        let policy = TetherConfig::default().security_policy();
        assert!(!policy.can_see(Some(&window("Vault", "KeePassXC"))));
    }
}
