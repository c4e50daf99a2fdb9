//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `ARCHFORGE_*` environment variables, e.g. `ARCHFORGE_DEFAULTS__PROVIDER`
//! 3. `--config FILE`, or else `./.archforge.toml` over the user config file
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// File name of a per-directory configuration.
pub const LOCAL_CONFIG: &str = ".archforge.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Values used when `generate` is run without the matching flag.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub provider: String,
    /// Empty means the provider's home region.
    pub region: String,
    pub environment: String,
    pub format: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            provider: "aws".into(),
            region: String::new(),
            environment: "dev".into(),
            format: "terraform".into(),
            output_dir: PathBuf::from("infra"),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, files and the environment.
    ///
    /// An explicit `config_file` must exist; the implicit locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        builder = match config_file {
            Some(path) => builder.add_source(toml_file(path).required(true)),
            None => builder
                .add_source(toml_file(&Self::config_path()).required(false))
                .add_source(toml_file(Path::new(LOCAL_CONFIG)).required(false)),
        };
        builder = builder.add_source(
            Environment::with_prefix("ARCHFORGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(Config::try_deserialize)
            .context("Failed to load configuration")
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.archforge.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("io", "archforge", "archforge")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG))
    }

    /// Look up a dotted key such as `defaults.provider`.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "defaults.provider" => self.defaults.provider.clone(),
            "defaults.region" => self.defaults.region.clone(),
            "defaults.environment" => self.defaults.environment.clone(),
            "defaults.format" => self.defaults.format.clone(),
            "defaults.output_dir" => self.defaults.output_dir.display().to_string(),
            "output.no_color" => self.output.no_color.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Every key understood by [`AppConfig::get`].
    pub const KEYS: [&'static str; 6] = [
        "defaults.provider",
        "defaults.region",
        "defaults.environment",
        "defaults.format",
        "defaults.output_dir",
        "output.no_color",
    ];
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_terraform_on_aws() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.defaults.provider, "aws");
        assert_eq!(cfg.defaults.format, "terraform");
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archforge.toml");
        std::fs::write(
            &path,
            "[defaults]\nprovider = \"gcp\"\nregion = \"europe-west1\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.provider, "gcp");
        assert_eq!(cfg.defaults.region, "europe-west1");
        // untouched keys keep their defaults
        assert_eq!(cfg.defaults.format, "terraform");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = PathBuf::from("/definitely/not/archforge.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn every_key_resolves() {
        let cfg = AppConfig::default();
        for key in AppConfig::KEYS {
            assert!(cfg.get(key).is_some(), "{key}");
        }
        assert_eq!(cfg.get("defaults.lang"), None);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
