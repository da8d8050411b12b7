//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};
use storm_application::config::PipelineConfig;
use tracing::debug;

/// Prefix of environment overrides (`SCI_STORM_BACKEND__MODEL=...`).
pub const ENV_PREFIX: &str = "SCI_STORM_";

const PROJECT_FILES: [&str; 3] = ["sci-storm.yaml", "sci-storm.yml", "sci-storm.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `SCI_STORM_*` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./sci-storm.yaml`, `./sci-storm.yml` or `./sci-storm.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/sci-storm/config.yaml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Merging global config {}", global_path.display());
            figment = Self::merge_file(figment, &global_path);
        }

        if let Some(project_path) = Self::project_config_path() {
            debug!("Merging project config {}", project_path.display());
            figment = Self::merge_file(figment, &project_path);
        }

        if let Some(path) = config_path {
            debug!("Merging explicit config {}", path.display());
            figment = Self::merge_file(figment, path);
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load and validate into the immutable pipeline snapshot.
    pub fn load_pipeline(config_path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
        Ok(Self::load(config_path)?.into_pipeline_config()?)
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/sci-storm/config.yaml if set,
    /// otherwise falls back to ~/.config/sci-storm/config.yaml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sci-storm").join("config.yaml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// TOML by `.toml` extension, YAML otherwise.
    fn merge_file(figment: Figment, path: &Path) -> Figment {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            figment.merge(Toml::file(path))
        } else {
            figment.merge(Yaml::file(path))
        }
    }
}
