//! Device configuration

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_DEVICE_NAME: &str = "msgdev";
const DEFAULT_CLASS_NAME: &str = "char";

/// Names used when registering with the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Name of the character device region and of its node
    pub device_name: String,
    /// Device class the node is created under
    pub class_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            class_name: DEFAULT_CLASS_NAME.to_string(),
        }
    }
}

impl DeviceConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("device_name", &self.device_name), ("class_name", &self.class_name)] {
            if value.is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
            if value.contains('/') {
                return Err(Error::Config(format!("{} must not contain '/': {}", key, value)));
            }
        }
        Ok(())
    }
}
