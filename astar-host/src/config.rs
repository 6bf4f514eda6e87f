//! Bridge configuration (`astar.toml`).
//!
//! Every field has a default, so an empty file (or no file) is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Compiled module to load, relative to the module source root.
    #[serde(default = "default_module_path")]
    pub module_path: String,
    /// Passed to the module's `init` as 1/0.
    #[serde(default = "default_true")]
    pub debug: bool,
    /// Passed to the module's `init`; the module uses it as its debug tick period.
    #[serde(default = "default_render_interval_ms")]
    pub render_interval_ms: i32,
    /// Id of the display container layers are attached to.
    #[serde(default = "default_container_id")]
    pub container_id: String,
    /// Display refresh rate driving animation-frame ticks.
    #[serde(default = "default_refresh_rate_hz")]
    pub refresh_rate_hz: u32,
    /// Fixed seed for `js_random`; entropy-seeded when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_module_path() -> String {
    "wasm_astar.wasm".to_string()
}
fn default_true() -> bool {
    true
}
fn default_render_interval_ms() -> i32 {
    1000
}
fn default_container_id() -> String {
    "renderer".to_string()
}
fn default_refresh_rate_hz() -> u32 {
    60
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module_path: default_module_path(),
            debug: true,
            render_interval_ms: default_render_interval_ms(),
            container_id: default_container_id(),
            refresh_rate_hz: default_refresh_rate_hz(),
            rng_seed: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
