//! Test doubles shared by unit and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::session::{EventKind, InboundEvent, UserIdentity};
use crate::store::{CounterField, LeaderboardEntry, StoreError, UserRecord, UserStore};
use crate::transport::{ChatTransport, MenuButton, TransportError};

/// A message the bot tried to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text { chat_id: i64, text: String },
    Menu { chat_id: i64, text: String, buttons: Vec<MenuButton> },
    Photo { chat_id: i64, image: Vec<u8>, caption: String },
}

/// Transport that records every outbound message instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Sent> {
        self.sent.lock().unwrap().last().cloned()
    }

    fn push(&self, message: Sent) {
        self.sent.lock().unwrap().push(message);
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.push(Sent::Text { chat_id, text: text.to_string() });
        Ok(())
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[MenuButton],
    ) -> Result<(), TransportError> {
        self.push(Sent::Menu {
            chat_id,
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.push(Sent::Photo { chat_id, image, caption: caption.to_string() });
        Ok(())
    }
}

/// Transport whose first `failures` sends fail; later sends are recorded.
pub struct FailingTransport {
    failures_left: AtomicUsize,
    inner: RecordingTransport,
}

impl FailingTransport {
    pub fn new(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            inner: RecordingTransport::new(),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.inner.sent()
    }

    fn check(&self) -> Result<(), TransportError> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::SendFailed("network unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for FailingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        self.check()?;
        self.inner.send_text(chat_id, text).await
    }

    async fn send_menu(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[MenuButton],
    ) -> Result<(), TransportError> {
        self.check()?;
        self.inner.send_menu(chat_id, text, buttons).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image: Vec<u8>,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.check()?;
        self.inner.send_photo(chat_id, image, caption).await
    }
}

/// Store whose every call fails, as if the database were down.
pub struct UnavailableStore;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

impl UserStore for UnavailableStore {
    fn ensure_schema(&self) -> Result<(), StoreError> {
        Err(down())
    }

    fn get(&self, _user_id: i64) -> Result<Option<UserRecord>, StoreError> {
        Err(down())
    }

    fn upsert(&self, _: i64, _: &str, _: CounterField, _: i64) -> Result<(), StoreError> {
        Err(down())
    }

    fn increment(&self, _: i64, _: &str, _: CounterField) -> Result<i64, StoreError> {
        Err(down())
    }

    fn touch(&self, _: i64, _: &str) -> Result<(), StoreError> {
        Err(down())
    }

    fn top_n(&self, _: CounterField, _: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Err(down())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Err(down())
    }
}

/// Event from a private chat, where chat id and user id coincide.
pub fn private_event(user_id: i64, name: &str, kind: EventKind) -> InboundEvent {
    InboundEvent {
        chat_id: user_id,
        user: UserIdentity {
            user_id,
            display_name: name.to_string(),
        },
        kind,
    }
}

pub fn click(user_id: i64, name: &str, payload: &str) -> InboundEvent {
    private_event(user_id, name, EventKind::Button(payload.to_string()))
}
