//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `ARMATURE_*` environment variables (e.g. `ARMATURE_OUTPUT__NO_COLOR`)
//! 3. `armature.toml` in the working directory
//! 4. The user config file under the platform config directory
//! 5. Built-in defaults (always present)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Output settings.
    pub output: OutputConfig,
    /// Scaffolding settings.
    pub scaffold: ScaffoldConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Where generated artifacts land.  Defaults to the working directory.
    pub output_dir: Option<PathBuf>,
    /// How deep project discovery walks when probing for manifests.
    pub search_depth: usize,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            search_depth: 2,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config files, and environment.
    pub fn load() -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(dirs) = directories::ProjectDirs::from("dev", "Armature", "armature") {
            let user_config = dirs.config_dir().join("config");
            builder = builder.add_source(config::File::from(user_config).required(false));
        }
        builder = builder
            .add_source(config::File::with_name("armature").required(false))
            .add_source(config::Environment::with_prefix("ARMATURE").separator("__"));

        let loaded = builder.build()?;
        Ok(loaded.try_deserialize()?)
    }
}
