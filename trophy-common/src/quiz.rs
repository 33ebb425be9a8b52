//! Quiz question records.

use serde::{Deserialize, Serialize};

use crate::ButtonAction;

/// A multiple choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    /// Must be one of `options`
    pub correct: String,
    /// Options in display order, one button each
    pub options: Vec<String>,
}

impl QuizQuestion {
    pub fn new(prompt: &str, correct: &str, options: &[&str]) -> Self {
        Self {
            prompt: prompt.to_string(),
            correct: correct.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    /// One `(label, action)` pair per option, in display order.
    pub fn answer_buttons(&self) -> Vec<(String, ButtonAction)> {
        self.options
            .iter()
            .map(|option| {
                (
                    option.clone(),
                    ButtonAction::QuizAnswer {
                        selected: option.clone(),
                        correct: self.correct.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Built-in questions used when the configuration does not provide any.
pub fn default_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "What is this trophy called?",
            "Champions Cup",
            &["Champions Cup", "Victory Trophy", "Sports Medal"],
        ),
        QuizQuestion::new(
            "What rarity is the Victory Trophy?",
            "Rare",
            &["Legendary", "Rare", "Common"],
        ),
    ]
}
