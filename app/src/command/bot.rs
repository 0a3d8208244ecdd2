use crate::command::CommandStrategy;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use zonebot_config::{Config, Strings};
use zonebot_conversation::{Engine, EngineConfig, RandomPicker};
use zonebot_geo::{GeoCityResolver, NominatimGeocoder, TzfLocator};
use zonebot_telegram::ZoneBot;

/// Input for the bot command.
pub struct BotInput {
    /// Optional bot token (overrides config)
    pub token: Option<String>,
    /// Optional allowed chat IDs (overrides config)
    pub allow_from: Option<Vec<String>>,
}

/// Strategy for running the Telegram bot.
pub struct BotStrategy;

impl CommandStrategy for BotStrategy {
    type Input = BotInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        info!("Loaded config from ~/zonebot/config.json");

        let strings = Strings::load(&Config::config_dir()?)?;

        // Get token from input or config
        let token = if let Some(t) = input.token {
            t
        } else if !config.telegram.token.is_empty() {
            config.telegram.token.clone()
        } else {
            anyhow::bail!("Telegram bot token not configured. Set \"telegram.token\" in config");
        };

        // Get allowed chats from input or config
        let allow_from = input
            .allow_from
            .unwrap_or_else(|| config.telegram.allow_from.clone());

        info!("Starting zonebot...");

        let geocoder = NominatimGeocoder::new(
            &config.geocoder.user_agent,
            Duration::from_secs(config.geocoder.timeout_secs),
        )?
        .with_base_url(config.geocoder.base_url.clone());

        // Loads the bundled polygon dataset; takes a moment, done once.
        let locator = TzfLocator::new();
        let resolver = Arc::new(GeoCityResolver::new(geocoder, locator));

        let engine = Engine::new(
            resolver,
            Arc::new(RandomPicker),
            EngineConfig {
                welcome_message: strings.welcome_message,
                description: strings.description,
                malformed_policy: config.conversation.malformed_input_policy,
            },
        );

        let bot = ZoneBot::new(
            token,
            engine,
            Duration::from_secs(config.conversation.session_timeout_secs),
            &allow_from,
        );

        info!("Zonebot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}
