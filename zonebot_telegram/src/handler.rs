use crate::{Command, Error, Result, ZoneBot, keyboard};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatAction, Message};
use tracing::info;
use zonebot_conversation::{Input, MenuAction};

/// Handle an incoming text message.
pub(crate) async fn handle_message(bot: ZoneBot, msg: Message) -> Result<()> {
    let chat_id = msg.chat.id.0;

    if !bot.is_allowed(chat_id) {
        return Err(Error::Unauthorized(chat_id));
    }

    let text = msg
        .text()
        .ok_or_else(|| Error::Config("No text content".to_string()))?;

    if let Some(command) = Command::parse_from_text(text) {
        return handle_command(&bot, chat_id, command).await;
    }

    info!("Received message from {chat_id}: {text}");

    // City names and time specs can take a network round-trip to resolve
    bot.bot
        .send_chat_action(msg.chat.id, ChatAction::Typing)
        .await?;

    bot.process_input(chat_id, Input::Text(text.to_string()))
        .await
}

async fn handle_command(bot: &ZoneBot, chat_id: i64, command: Command) -> Result<()> {
    match command {
        Command::Start | Command::Restart => bot.restart_session(chat_id).await,
        Command::Help => bot.send_help(chat_id).await,
    }
}

/// Handle an inline keyboard press.
pub(crate) async fn handle_callback_query(bot: ZoneBot, query: CallbackQuery) -> Result<()> {
    // Acknowledge first so the client stops showing a spinner
    bot.bot.answer_callback_query(query.id.clone()).await?;

    let Some(data) = query.data else {
        return Ok(());
    };

    let Some(chat_id) = query.message.as_ref().map(|m| m.chat().id.0) else {
        return Ok(());
    };

    if !bot.is_allowed(chat_id) {
        return Err(Error::Unauthorized(chat_id));
    }

    info!("Received callback from {chat_id}: {data}");

    if data == keyboard::RESTART_TOKEN {
        return bot.restart_session(chat_id).await;
    }

    match MenuAction::parse(&data) {
        Some(action) => bot.process_input(chat_id, Input::Menu(action)).await,
        None => Ok(()),
    }
}
