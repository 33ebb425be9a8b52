//! Button payload protocol.
//!
//! Every inline button carries an opaque string that comes back verbatim when
//! the user clicks it. Plain actions are a single tag; quiz answers carry
//! three fields separated by [`SEPARATOR`]:
//!
//! ```text
//! quiz_answer|<selected option>|<correct option>
//! ```
//!
//! # Security
//!
//! The correct answer travels through the client, so nothing stops a modified
//! client from sending `quiz_answer|x|x`. The quiz is a toy, not a security
//! boundary; no server-side session is kept.

use std::fmt;

/// Field separator for multi-field payloads. Option text must not contain it.
pub const SEPARATOR: char = '|';

const GET_IMAGE: &str = "get_image";
const LEADERBOARD: &str = "rating";
const QUIZ: &str = "quiz";
const QUIZ_LEADERBOARD: &str = "quiz_rating";
const QUIZ_ANSWER: &str = "quiz_answer";

/// Action decoded from a button click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Draw a random reward image.
    GetImage,
    /// Show the top players by rating.
    Leaderboard,
    /// Ask a random quiz question.
    Quiz,
    /// Show the top players by quiz score.
    QuizLeaderboard,
    /// Answer to a previously asked question.
    QuizAnswer { selected: String, correct: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Malformed payload {payload:?}: expected 3 fields, got {fields}")]
    Malformed { payload: String, fields: usize },
    #[error("Unknown action: {0:?}")]
    UnknownAction(String),
}

impl ButtonAction {
    /// Decode a raw callback payload.
    pub fn parse(payload: &str) -> Result<Self, PayloadError> {
        let fields: Vec<&str> = payload.split(SEPARATOR).collect();

        match fields[0] {
            QUIZ_ANSWER => {
                if fields.len() != 3 {
                    return Err(PayloadError::Malformed {
                        payload: payload.to_string(),
                        fields: fields.len(),
                    });
                }
                Ok(ButtonAction::QuizAnswer {
                    selected: fields[1].to_string(),
                    correct: fields[2].to_string(),
                })
            }
            _ if fields.len() != 1 => Err(PayloadError::UnknownAction(payload.to_string())),
            GET_IMAGE => Ok(ButtonAction::GetImage),
            LEADERBOARD => Ok(ButtonAction::Leaderboard),
            QUIZ => Ok(ButtonAction::Quiz),
            QUIZ_LEADERBOARD => Ok(ButtonAction::QuizLeaderboard),
            other => Err(PayloadError::UnknownAction(other.to_string())),
        }
    }

    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            ButtonAction::GetImage => GET_IMAGE,
            ButtonAction::Leaderboard => LEADERBOARD,
            ButtonAction::Quiz => QUIZ,
            ButtonAction::QuizLeaderboard => QUIZ_LEADERBOARD,
            ButtonAction::QuizAnswer { .. } => QUIZ_ANSWER,
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonAction::QuizAnswer { selected, correct } => {
                write!(f, "{QUIZ_ANSWER}{SEPARATOR}{selected}{SEPARATOR}{correct}")
            }
            other => f.write_str(other.name()),
        }
    }
}
