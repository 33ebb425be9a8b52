//! Per-event session handling.
//!
//! Each inbound event is handled to completion: the user row is materialized,
//! the action runs, and exactly the replies for that action are sent. No state
//! survives between events except the user record itself; the quiz's correct
//! answer round-trips through the button payload.

use std::sync::Arc;

use trophy_common::ButtonAction;

use crate::catalog::{QuizBank, RewardCatalog};
use crate::images::ImageClient;
use crate::store::{CounterField, LeaderboardEntry, StoreError, UserRecord, UserStore};
use crate::transport::{ChatTransport, MenuButton, TransportError};

/// Number of rows shown on the leaderboards.
pub const LEADERBOARD_SIZE: usize = 5;

pub const WELCOME_TEXT: &str = "Hi! Choose an action:";
pub const HELP_TEXT: &str = "Use /start to get started.";
pub const IMAGE_FAILURE_TEXT: &str = "Failed to load the image.";
pub const CORRECT_ANSWER_TEXT: &str = "✅ Correct! You earned 1 point.";
pub const STORE_FAILURE_TEXT: &str = "Something went wrong, please try again later.";

/// Who sent an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: i64,
    /// Full name as shown by the chat platform
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// Button click with its raw payload
    Button(String),
}

/// A single inbound chat event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Chat the replies go to
    pub chat_id: i64,
    pub user: UserIdentity,
    pub kind: EventKind,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The main menu, one button per action.
pub fn main_menu() -> Vec<MenuButton> {
    vec![
        MenuButton::new("💙 Get an image", ButtonAction::GetImage.to_string()),
        MenuButton::new("⭐️ Leaderboard", ButtonAction::Leaderboard.to_string()),
        MenuButton::new("❓ Quiz", ButtonAction::Quiz.to_string()),
        MenuButton::new("📊 Quiz leaderboard", ButtonAction::QuizLeaderboard.to_string()),
    ]
}

/// Render a leaderboard: 1-based ranking followed by the caller's own score.
pub fn format_leaderboard(
    title: &str,
    entries: &[LeaderboardEntry],
    own_label: &str,
    own_score: i64,
) -> String {
    let ranking: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}: {} points", i + 1, entry.display_name, entry.score))
        .collect();

    format!(
        "{} (top {}):\n{}\n\n{}: {}",
        title,
        LEADERBOARD_SIZE,
        ranking.join("\n"),
        own_label,
        own_score
    )
}

pub fn wrong_answer_text(correct: &str) -> String {
    format!("❌ Wrong! The correct answer is: {}.", correct)
}

/// Maps chat events to actions on the store, catalogs and transport.
pub struct SessionHandler {
    store: Arc<dyn UserStore>,
    rewards: RewardCatalog,
    quiz: QuizBank,
    images: ImageClient,
    transport: Arc<dyn ChatTransport>,
}

impl SessionHandler {
    pub fn new(
        store: Arc<dyn UserStore>,
        rewards: RewardCatalog,
        quiz: QuizBank,
        images: ImageClient,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            store,
            rewards,
            quiz,
            images,
            transport,
        }
    }

    /// Handle one event.
    ///
    /// Store failures are logged and reported to the user as a generic error;
    /// only a failure to deliver a reply is returned.
    pub async fn handle(&self, event: InboundEvent) -> Result<(), TransportError> {
        match self.dispatch(&event).await {
            Ok(()) => Ok(()),
            Err(SessionError::Store(e)) => {
                tracing::error!(user_id = event.user.user_id, "Store failure: {}", e);
                self.transport.send_text(event.chat_id, STORE_FAILURE_TEXT).await
            }
            Err(SessionError::Transport(e)) => Err(e),
        }
    }

    async fn dispatch(&self, event: &InboundEvent) -> Result<(), SessionError> {
        let user = &event.user;
        let record = self.store.ensure_user(user.user_id, &user.display_name)?;

        match &event.kind {
            EventKind::Start => {
                tracing::debug!(user_id = user.user_id, "Showing main menu");
                self.transport
                    .send_menu(event.chat_id, WELCOME_TEXT, &main_menu())
                    .await?;
            }
            EventKind::Help => {
                self.transport.send_text(event.chat_id, HELP_TEXT).await?;
            }
            EventKind::Button(payload) => match ButtonAction::parse(payload) {
                Ok(action) => {
                    tracing::debug!(
                        user_id = user.user_id,
                        action = action.name(),
                        "Button clicked"
                    );
                    self.run_action(event, &record, action).await?;
                }
                Err(e) => {
                    tracing::warn!(user_id = user.user_id, "Ignoring button payload: {}", e);
                }
            },
        }

        Ok(())
    }

    async fn run_action(
        &self,
        event: &InboundEvent,
        record: &UserRecord,
        action: ButtonAction,
    ) -> Result<(), SessionError> {
        match action {
            ButtonAction::GetImage => self.draw_reward(event).await,
            ButtonAction::Leaderboard => {
                let entries = self.store.top_n(CounterField::Rating, LEADERBOARD_SIZE)?;
                let text = format_leaderboard(
                    "Leaderboard",
                    &entries,
                    "Your points",
                    record.score(CounterField::Rating),
                );
                self.transport.send_text(event.chat_id, &text).await?;
                Ok(())
            }
            ButtonAction::QuizLeaderboard => {
                let entries = self.store.top_n(CounterField::QuizScore, LEADERBOARD_SIZE)?;
                let text = format_leaderboard(
                    "Quiz leaderboard",
                    &entries,
                    "Your quiz points",
                    record.score(CounterField::QuizScore),
                );
                self.transport.send_text(event.chat_id, &text).await?;
                Ok(())
            }
            ButtonAction::Quiz => {
                let question = self.quiz.draw_one();
                let buttons: Vec<MenuButton> = question
                    .answer_buttons()
                    .into_iter()
                    .map(|(label, action)| MenuButton::new(label, action.to_string()))
                    .collect();
                self.transport
                    .send_menu(event.chat_id, &question.prompt, &buttons)
                    .await?;
                Ok(())
            }
            ButtonAction::QuizAnswer { selected, correct } => {
                self.grade_answer(event, &selected, &correct).await
            }
        }
    }

    /// Draw a reward and send its image. The rating only grows once the image
    /// bytes have been fetched.
    async fn draw_reward(&self, event: &InboundEvent) -> Result<(), SessionError> {
        let user = &event.user;
        let item = self.rewards.draw_one();

        match self.images.fetch(&item.image_url).await {
            Ok(image) => {
                let rating = self.store.increment(
                    user.user_id,
                    &user.display_name,
                    CounterField::Rating,
                )?;
                tracing::info!(
                    user_id = user.user_id,
                    reward = %item.name,
                    rarity = %item.rarity,
                    rating,
                    "Reward drawn"
                );
                self.transport
                    .send_photo(event.chat_id, image, &item.caption())
                    .await?;
            }
            Err(e) => {
                tracing::warn!(
                    user_id = user.user_id,
                    url = %item.image_url,
                    "Image fetch failed: {}",
                    e
                );
                self.transport
                    .send_text(event.chat_id, IMAGE_FAILURE_TEXT)
                    .await?;
            }
        }

        Ok(())
    }

    async fn grade_answer(
        &self,
        event: &InboundEvent,
        selected: &str,
        correct: &str,
    ) -> Result<(), SessionError> {
        let user = &event.user;

        if selected == correct {
            let score = self.store.increment(
                user.user_id,
                &user.display_name,
                CounterField::QuizScore,
            )?;
            tracing::info!(user_id = user.user_id, quiz_score = score, "Correct quiz answer");
            self.transport
                .send_text(event.chat_id, CORRECT_ANSWER_TEXT)
                .await?;
        } else {
            tracing::debug!(user_id = user.user_id, "Wrong quiz answer");
            self.transport
                .send_text(event.chat_id, &wrong_answer_text(correct))
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_has_four_actions() {
        let payloads: Vec<String> = main_menu().into_iter().map(|b| b.payload).collect();
        assert_eq!(payloads, vec!["get_image", "rating", "quiz", "quiz_rating"]);
    }

    #[test]
    fn test_format_leaderboard() {
        let entries = vec![
            LeaderboardEntry { display_name: "Alice".to_string(), score: 4 },
            LeaderboardEntry { display_name: "Bob".to_string(), score: 2 },
        ];
        let text = format_leaderboard("Leaderboard", &entries, "Your points", 2);
        assert_eq!(
            text,
            "Leaderboard (top 5):\n1. Alice: 4 points\n2. Bob: 2 points\n\nYour points: 2"
        );
    }

    #[test]
    fn test_wrong_answer_text_names_correct_option() {
        assert_eq!(wrong_answer_text("Rare"), "❌ Wrong! The correct answer is: Rare.");
    }
}
