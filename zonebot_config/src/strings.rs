use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Localized strings store; only two keys are read by the core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Strings {
    /// Sent once on first contact.
    pub welcome_message: String,
    /// Sent for the Help button and `/help`.
    pub description: String,
}

impl Strings {
    /// Load the strings file once at startup. A missing or malformed
    /// file is startup-fatal.
    pub fn load(config_dir: &Path) -> anyhow::Result<Self> {
        let path = config_dir.join("en_strings.json");
        let content = std::fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!(
                "Strings file not found at: {} ({e}). Please run 'zonebot init'.",
                path.display()
            )
        })?;
        let strings: Self = serde_json::from_str(&content)?;
        info!("Loaded strings from {}", path.display());
        Ok(strings)
    }

    pub(crate) fn create_strings(config_dir: &Path) -> anyhow::Result<()> {
        let path = config_dir.join("en_strings.json");
        if path.exists() {
            return Ok(());
        }

        let template = Self {
            welcome_message: "👋 Welcome! I can tell you the current time in any city, \
                              convert times between cities, and compare time differences."
                .to_string(),
            description: "Send me a city name to get its current time. Use the buttons to \
                          convert a time to another city, compare the time difference between \
                          two cities, or look up a new city."
                .to_string(),
        };

        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        println!("✅ Created strings file at: {}", path.display());
        Ok(())
    }
}
