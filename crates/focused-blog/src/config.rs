//! Registry configuration.

use serde::{Deserialize, Serialize};

use focused_blog_core::TWO_WEEKS_SECONDS;

use crate::error::{RegistryError, Result};

/// Configuration for the Registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collection name.
    pub name: String,
    /// Collection symbol.
    pub symbol: String,
    /// Adjacent posts must be closer than this many seconds to extend a streak.
    pub streak_window: i64,
    /// Buffered events per subscriber before the slowest one starts lagging.
    pub event_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "FocusedBlogPost".to_string(),
            symbol: "FBP".to_string(),
            streak_window: TWO_WEEKS_SECONDS,
            event_capacity: 256,
        }
    }
}

impl RegistryConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.streak_window <= 0 {
            return Err(RegistryError::InvalidConfig(format!(
                "streak_window must be positive, got {}",
                self.streak_window
            )));
        }
        if self.event_capacity == 0 {
            return Err(RegistryError::InvalidConfig(
                "event_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
