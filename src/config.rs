//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/allotree/allotree.toml`
//! 3. Local config: `<dir>/.allotree.toml`
//! 4. Environment variables: `ALLOTREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// How trees are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the variance column
    pub show_variance: bool,
    /// Show the grand total line
    pub show_total: bool,
    /// Default output format
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_variance: true,
            show_total: true,
            format: OutputFormat::Text,
        }
    }
}

/// Raw display config for intermediate parsing (`None` means "inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub show_variance: Option<bool>,
    pub show_total: Option<bool>,
    pub format: Option<OutputFormat>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub seed: Option<PathBuf>,
    pub display: RawDisplayConfig,
}

impl DisplayConfig {
    fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            show_variance: overlay.show_variance.unwrap_or(self.show_variance),
            show_total: overlay.show_total.unwrap_or(self.show_total),
            format: overlay.format.unwrap_or(self.format),
        }
    }
}

/// Unified configuration for allotree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Seed file used when `--seed` is not given (demo seed if unset)
    pub seed: Option<PathBuf>,
    /// Rendering options
    pub display: DisplayConfig,
}

/// Get the XDG config directory for allotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "allotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("allotree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".allotree.toml")
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string; unknown variables leave it as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            seed: overlay.seed.clone().or_else(|| self.seed.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    fn expand_paths(&mut self) {
        if let Some(seed) = &self.seed {
            self.seed = Some(PathBuf::from(expand_env_vars(&seed.to_string_lossy())));
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.allotree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("load: local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ALLOTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ALLOTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("seed") {
            settings.seed = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("display.show_variance") {
            settings.display.show_variance = val;
        }
        if let Ok(val) = config.get_bool("display.show_total") {
            settings.display.show_total = val;
        }
        if let Ok(val) = config.get_string("display.format") {
            settings.display.format = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# allotree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/allotree/allotree.toml
#   Local:  <dir>/.allotree.toml
#   Env:    ALLOTREE_* environment variables, e.g. ALLOTREE_DISPLAY__FORMAT=json

# Seed file (.toml or .json) loaded when --seed is not given
# seed = "~/budgets/2026.toml"

[display]
# show_variance = true
# show_total = true
# format = "text"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_with_overlay_wins_when_set() {
        let base = Settings::default();
        let overlay = RawSettings {
            seed: Some(PathBuf::from("/tmp/seed.toml")),
            display: RawDisplayConfig {
                show_variance: Some(false),
                ..Default::default()
            },
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.seed, Some(PathBuf::from("/tmp/seed.toml")));
        assert!(!merged.display.show_variance);
        assert!(merged.display.show_total);
        assert_eq!(merged.display.format, OutputFormat::Text);
    }

    #[test]
    fn test_template_parses_as_raw_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.seed.is_none());
        assert!(raw.display.format.is_none());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
