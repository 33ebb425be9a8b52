//! Chat transport abstraction.
//!
//! The session handler only talks to the chat platform through
//! [`ChatTransport`]. The Telegram implementation lives in [`telegram`];
//! tests use the recording transport from `test_util`.

pub mod telegram;

pub use telegram::TelegramTransport;

use async_trait::async_trait;

/// One inline button: the visible label and the payload sent back on click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub payload: String,
}

impl MenuButton {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send message: {0}")]
    SendFailed(String),
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    /// Send a text message with buttons, one per row, in the given order.
    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[MenuButton],
    ) -> Result<(), TransportError>;

    /// Send an image with a caption.
    async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
    ) -> Result<(), TransportError>;
}
