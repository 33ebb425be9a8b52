//! Telegram transport and update loop.

use std::future::IntoFuture;
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, User};
use teloxide::utils::command::BotCommands;

use super::{ChatTransport, MenuButton, TransportError};
use crate::session::{EventKind, InboundEvent, SessionHandler, UserIdentity};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Commands the bot understands.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "show how to use the bot")]
    Help,
}

/// Sends replies through the Telegram Bot API.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn send_failed(e: teloxide::RequestError) -> TransportError {
    TransportError::SendFailed(e.to_string())
}

/// One button per row, like a vertical menu.
fn keyboard(buttons: &[MenuButton]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(buttons.iter().map(|button| {
        vec![InlineKeyboardButton::callback(
            button.label.clone(),
            button.payload.clone(),
        )]
    }))
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(send_failed)?;
        Ok(())
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[MenuButton],
    ) -> Result<(), TransportError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(keyboard(buttons))
            .await
            .map_err(send_failed)?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.bot
            .send_photo(ChatId(chat_id), InputFile::memory(image).file_name("reward.jpg"))
            .caption(caption)
            .await
            .map_err(send_failed)?;
        Ok(())
    }
}

fn identity(user: &User) -> UserIdentity {
    UserIdentity {
        user_id: user.id.0 as i64,
        display_name: user.full_name(),
    }
}

/// Publish the command list shown in the client's menu.
pub async fn register_commands(bot: &Bot) {
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }
}

/// Receive updates until Ctrl-C.
///
/// Updates from different chats are handled concurrently; updates from the
/// same chat are handled in order.
pub async fn run(bot: Bot, handler: Arc<SessionHandler>) {
    let schema = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(on_command),
        )
        .branch(Update::filter_callback_query().endpoint(on_callback));

    tracing::info!("Listening for Telegram updates");

    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![handler])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_command(msg: Message, cmd: Command, handler: Arc<SessionHandler>) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let kind = match cmd {
        Command::Start => EventKind::Start,
        Command::Help => EventKind::Help,
    };

    handler
        .handle(InboundEvent {
            chat_id: msg.chat.id.0,
            user: identity(user),
            kind,
        })
        .await?;

    Ok(())
}

async fn on_callback(
    bot: Bot,
    query: CallbackQuery,
    handler: Arc<SessionHandler>,
) -> HandlerResult {
    let chat_id = query
        .message
        .as_ref()
        .map(|message| message.chat().id)
        .unwrap_or_else(|| ChatId::from(query.from.id));

    let result = match query.data.clone() {
        Some(payload) => {
            handler
                .handle(InboundEvent {
                    chat_id: chat_id.0,
                    user: identity(&query.from),
                    kind: EventKind::Button(payload),
                })
                .await
        }
        None => Ok(()),
    };

    acknowledge_then(result, bot.answer_callback_query(query.id.clone())).await
}

/// Await the callback acknowledgement, then report the handler outcome.
///
/// The acknowledgement always runs so the client's loading spinner stops.
/// A handler error takes precedence over an acknowledgement error.
async fn acknowledge_then<A, T, E>(result: Result<(), TransportError>, ack: A) -> HandlerResult
where
    A: IntoFuture<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let acked = ack.await;
    if let Err(e) = result {
        if let Err(ack_error) = &acked {
            tracing::warn!("Callback acknowledgement failed: {}", ack_error);
        }
        return Err(e.into());
    }
    acked?;

    Ok(())
}
