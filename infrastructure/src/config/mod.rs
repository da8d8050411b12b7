//! Configuration file loading for sci-storm
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SCI_STORM_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file (YAML or TOML by extension)
//! 3. Project root: `./sci-storm.yaml`, `./sci-storm.yml` or `./sci-storm.toml`
//! 4. Global: `$XDG_CONFIG_HOME/sci-storm/config.yaml`
//! 5. Default values
//!
//! String values may reference environment variables as `${VAR}` or `$VAR`.

mod env;
mod file_config;
mod loader;

pub use env::{expand_env, expand_env_with};
pub use file_config::{
    ConfigError, ConfigValidationError, FileBackendConfig, FileConfig, FileDebateConfig,
    FileMcpConfig, FileOutputConfig, FileRagConfig, FileTavilyConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};
