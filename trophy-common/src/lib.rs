//! Trophy Bot Common Types
//!
//! Catalog records and the button payload protocol shared by the bot and its tests.

pub mod payload;
pub mod quiz;
pub mod reward;

pub use payload::{ButtonAction, PayloadError, SEPARATOR};
pub use quiz::{default_questions, QuizQuestion};
pub use reward::{default_rewards, RewardItem};
