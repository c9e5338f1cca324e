use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{fs, net::SocketAddr, path::{Path, PathBuf}};

use crate::mapper::DEFAULT_THRESHOLD;

pub const MODEL_FILE: &str = "cancellation_model.pt";
pub const META_FILE: &str = "cancellation_model.meta.json";
pub const CONFIG_FILE: &str = "ride_predictor.json";
pub const DEFAULT_PORT: u16 = 8050;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub meta_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(MODEL_FILE),
            meta_path: PathBuf::from(META_FILE),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub model: ModelConfig,
    pub threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            model: ModelConfig::default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let cfg: AppConfig = serde_json::from_str(&data).with_context(|| "invalid config JSON")?;
        if !(cfg.threshold > 0.0 && cfg.threshold < 1.0) {
            bail!("threshold must lie in (0, 1), got {}", cfg.threshold);
        }
        Ok(cfg)
    }

    /// Reads `path` when it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let cfg = Self::load(path)?;
            tracing::warn!(
                path = %path.display(),
                bind_addr = %cfg.bind_addr,
                threshold = cfg.threshold,
                "config file overrides built-in defaults"
            );
            Ok(cfg)
        } else {
            Ok(Self::default())
        }
    }
}
