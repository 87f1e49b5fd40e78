use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.json";

/// Which image host receives cover uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploaderKind {
    #[default]
    None,
    Litterbox,
    Imgur,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ImagesConfig {
    pub uploader: UploaderKind,
    pub imgur_client_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub poll_interval_sec: u64,
    pub images: ImagesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            poll_interval_sec: 5,
            images: ImagesConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it does not
    /// exist. Parse and validation failures are fatal to startup.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config file: {}", path.display()))
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_sec == 0 {
            anyhow::bail!("poll_interval_sec must be at least 1");
        }
        if self.images.uploader == UploaderKind::Imgur && self.images.imgur_client_id.is_empty() {
            anyhow::bail!("images.imgur_client_id is required when images.uploader is \"imgur\"");
        }
        Ok(())
    }
}
