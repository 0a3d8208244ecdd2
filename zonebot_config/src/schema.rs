use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use zonebot_core::MalformedInputPolicy;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    pub token: String,
    /// Chat IDs allowed to use the bot; empty means open access.
    #[serde(default)]
    pub allow_from: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeocoderConfig {
    #[serde(default = "GeocoderConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "GeocoderConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "GeocoderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            user_agent: Self::default_user_agent(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl GeocoderConfig {
    fn default_base_url() -> String {
        "https://nominatim.openstreetmap.org".to_string()
    }

    fn default_user_agent() -> String {
        "zonebot".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        10
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversationConfig {
    #[serde(default = "ConversationConfig::default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    #[serde(default)]
    pub malformed_input_policy: MalformedInputPolicy,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: Self::default_session_timeout_secs(),
            malformed_input_policy: MalformedInputPolicy::default(),
        }
    }
}

impl ConversationConfig {
    const fn default_session_timeout_secs() -> u64 {
        300
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'zonebot init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("zonebot"))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "telegram": {
    "token": "your-telegram-bot-token-here",
    "allow_from": []
  },
  "geocoder": {
    "base_url": "https://nominatim.openstreetmap.org",
    "user_agent": "zonebot",
    "timeout_secs": 10
  },
  "conversation": {
    "session_timeout_secs": 300,
    "malformed_input_policy": "reprompt"
  }
}"#;

        std::fs::write(&config_path, config_template)?;
        crate::Strings::create_strings(&config_dir)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Telegram bot token");
        println!("   2. Adjust en_strings.json if you want different welcome/help text");
        println!("   3. Run 'zonebot bot' to start the bot");
        println!();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn minimal_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"telegram": {"token": "t"}}"#)
            .expect("minimal config should parse");

        assert_eq!(config.geocoder.timeout_secs, 10);
        assert_eq!(config.conversation.session_timeout_secs, 300);
        assert_eq!(
            config.conversation.malformed_input_policy,
            MalformedInputPolicy::Reprompt
        );
        assert!(config.telegram.allow_from.is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn malformed_policy_parses_from_snake_case() {
        let config: Config = serde_json::from_str(
            r#"{
              "telegram": {"token": "t"},
              "conversation": {"malformed_input_policy": "return_to_menu"}
            }"#,
        )
        .expect("config should parse");

        assert_eq!(
            config.conversation.malformed_input_policy,
            MalformedInputPolicy::ReturnToMenu
        );
    }
}
