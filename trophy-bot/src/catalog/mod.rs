//! Static reward and quiz catalogs, loaded once at startup.

mod quiz;
mod rewards;

pub use quiz::QuizBank;
pub use rewards::RewardCatalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Reward catalog is empty")]
    NoRewards,
    #[error("Invalid reward weights: {0}")]
    InvalidWeights(String),
    #[error("Quiz bank is empty")]
    NoQuestions,
    #[error("Question {prompt:?}: correct answer {correct:?} is not one of the options")]
    MissingCorrectOption { prompt: String, correct: String },
    #[error("Question {prompt:?}: option {option:?} contains the payload separator")]
    SeparatorInOption { prompt: String, option: String },
    #[error("Question {prompt:?}: answer payload is {bytes} bytes, limit is 64")]
    PayloadTooLong { prompt: String, bytes: usize },
}
