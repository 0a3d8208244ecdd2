use crate::{Command, Result, keyboard};
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use teloxide::prelude::*;
use tokio::time::sleep;
use tracing::{info, warn};
use zonebot_conversation::{
    Engine, Input, Reply, SessionKey, SessionRegistry, SessionStore, TimeoutSupervisor,
};

/// Telegram bot wired to the conversation engine.
#[derive(Clone)]
pub struct ZoneBot {
    /// Teloxide bot instance
    pub bot: Bot,
    engine: Arc<Engine>,
    registry: Arc<SessionRegistry>,
    supervisor: Arc<TimeoutSupervisor>,
    /// Allowed chat IDs; empty means open access
    allowed_chats: Vec<i64>,
}

impl ZoneBot {
    pub fn new(
        token: String,
        engine: Engine,
        inactivity_window: Duration,
        allowed_chats: &[String],
    ) -> Self {
        let allowed_chats = allowed_chats
            .iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();

        Self {
            bot: Bot::new(token),
            engine: Arc::new(engine),
            registry: Arc::new(SessionRegistry::new()),
            supervisor: Arc::new(TimeoutSupervisor::new(inactivity_window)),
            allowed_chats,
        }
    }

    /// Back the session registry with a durable store.
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.registry = Arc::new(SessionRegistry::new().with_backing(store));
        self
    }

    /// Check if a chat is allowed
    #[must_use]
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }

    /// Run one transition for the chat's session and send the reply.
    ///
    /// A first message that is already a city name goes straight into the
    /// state machine; the welcome text is only sent from the explicit
    /// `/start` path (see [`Self::restart_session`]), matching the bot's
    /// `/start`-as-entry-point contract.
    pub async fn process_input(&self, chat_id: SessionKey, input: Input) -> Result<()> {
        let now = Utc::now();
        let (handle, _) = self.registry.get_or_create(chat_id, now).await;

        let (token, reply) = {
            let mut session = handle.lock().await;
            let token = session.touch(now);
            let reply = self.engine.handle(&mut session, input, now).await;
            self.registry.persist(chat_id, &session).await;
            (token, reply)
        };

        self.send_reply(chat_id, &reply).await?;
        self.arm_timeout(chat_id, token).await;
        Ok(())
    }

    /// Explicit restart: `/start`, `/restart`, or the Restart button.
    pub async fn restart_session(&self, chat_id: SessionKey) -> Result<()> {
        let now = Utc::now();
        let (handle, first_contact) = self.registry.get_or_create(chat_id, now).await;

        let (token, reply) = {
            let mut session = handle.lock().await;
            let token = session.touch(now);
            let reply = self.engine.restart(&mut session, first_contact);
            self.registry.persist(chat_id, &session).await;
            (token, reply)
        };

        self.send_reply(chat_id, &reply).await?;
        self.arm_timeout(chat_id, token).await;
        Ok(())
    }

    /// Send the help text. Conversation state is untouched, but the
    /// request still counts as activity for the inactivity deadline.
    pub async fn send_help(&self, chat_id: SessionKey) -> Result<()> {
        self.mark_activity(chat_id).await;
        let reply = self.engine.help();
        self.send_reply(chat_id, &reply).await
    }

    /// Record inbound activity for the chat and re-arm its deadline,
    /// without running a state-machine transition.
    async fn mark_activity(&self, chat_id: SessionKey) -> u64 {
        let now = Utc::now();
        let (handle, _) = self.registry.get_or_create(chat_id, now).await;

        let token = {
            let mut session = handle.lock().await;
            let token = session.touch(now);
            self.registry.persist(chat_id, &session).await;
            token
        };

        self.arm_timeout(chat_id, token).await;
        token
    }

    async fn arm_timeout(&self, chat_id: SessionKey, token: u64) {
        let bot = self.clone();
        self.supervisor
            .arm(chat_id, token, move || async move {
                bot.expire_session(chat_id, token).await;
            })
            .await;
    }

    /// Deferred timeout action. Re-validates the activity token: if a
    /// message got in first, this is a no-op.
    async fn expire_session(&self, chat_id: SessionKey, token: u64) {
        let Some(handle) = self.registry.get(chat_id).await else {
            return;
        };

        let expired = {
            let mut session = handle.lock().await;
            let expired = session.expire(token);
            if expired {
                self.registry.persist(chat_id, &session).await;
            }
            expired
        };

        if !expired {
            return;
        }

        info!("Session {chat_id} timed out after inactivity");
        let notice = self.engine.timeout_notice();
        if let Err(e) = self.send_reply(chat_id, &notice).await {
            warn!("Failed to deliver timeout notice to {chat_id}: {e}");
        }
    }

    async fn send_reply(&self, chat_id: SessionKey, reply: &Reply) -> Result<()> {
        let chat = ChatId(chat_id);
        let last = reply.messages.len().saturating_sub(1);

        for (index, message) in reply.messages.iter().enumerate() {
            let request = self.bot.send_message(chat, message);
            match reply.menu {
                // The keyboard rides on the last message only
                Some(menu) if index == last => {
                    request.reply_markup(keyboard::markup(menu)).await?;
                }
                _ => {
                    request.await?;
                }
            }
        }

        Ok(())
    }

    /// Test connection to Telegram API with incremental backoff.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) -> Result<()> {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(bot_user) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        bot_user
                            .user
                            .username
                            .unwrap_or_else(|| "no username".to_string()),
                        bot_user.user.id
                    );
                    return Ok(());
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);
                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");
                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run the bot
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await?;
        self.bot.set_my_commands(Command::bot_commands()).await?;

        let bot = self.bot.clone();

        let schema = dptree::entry()
            .branch(Update::filter_message().endpoint({
                let bot_clone = self.clone();
                move |_bot: Bot, msg: teloxide::types::Message| {
                    let bot_clone = bot_clone.clone();
                    async move { crate::handler::handle_message(bot_clone, msg).await }
                }
            }))
            .branch(Update::filter_callback_query().endpoint({
                let bot_clone = self.clone();
                move |_bot: Bot, query: teloxide::types::CallbackQuery| {
                    let bot_clone = bot_clone.clone();
                    async move { crate::handler::handle_callback_query(bot_clone, query).await }
                }
            }));

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
