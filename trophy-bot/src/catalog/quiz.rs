use rand::Rng;
use trophy_common::{QuizQuestion, SEPARATOR};

use super::CatalogError;

/// Telegram rejects callback data longer than this.
pub const MAX_PAYLOAD_BYTES: usize = 64;

/// Immutable set of quiz questions.
pub struct QuizBank {
    questions: Vec<QuizQuestion>,
}

impl QuizBank {
    pub fn new(questions: Vec<QuizQuestion>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::NoQuestions);
        }

        for question in &questions {
            if !question.options.contains(&question.correct) {
                return Err(CatalogError::MissingCorrectOption {
                    prompt: question.prompt.clone(),
                    correct: question.correct.clone(),
                });
            }
            if let Some(option) = question.options.iter().find(|o| o.contains(SEPARATOR)) {
                return Err(CatalogError::SeparatorInOption {
                    prompt: question.prompt.clone(),
                    option: option.clone(),
                });
            }
            let longest = question
                .answer_buttons()
                .iter()
                .map(|(_, action)| action.to_string().len())
                .max()
                .unwrap_or(0);
            if longest > MAX_PAYLOAD_BYTES {
                return Err(CatalogError::PayloadTooLong {
                    prompt: question.prompt.clone(),
                    bytes: longest,
                });
            }
        }

        tracing::info!("Loaded {} quiz questions", questions.len());
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    /// Pick a question uniformly at random.
    pub fn draw_one(&self) -> &QuizQuestion {
        self.draw_with(&mut rand::thread_rng())
    }

    pub fn draw_with<R: Rng>(&self, rng: &mut R) -> &QuizQuestion {
        &self.questions[rng.gen_range(0..self.questions.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_bank_rejected() {
        assert!(matches!(QuizBank::new(vec![]), Err(CatalogError::NoQuestions)));
    }

    #[test]
    fn test_correct_option_must_be_listed() {
        let question = QuizQuestion::new("Capital of France?", "Paris", &["Rome", "Madrid"]);
        assert!(matches!(
            QuizBank::new(vec![question]),
            Err(CatalogError::MissingCorrectOption { .. })
        ));
    }

    #[test]
    fn test_separator_in_option_rejected() {
        let question = QuizQuestion::new("Pick one", "a|b", &["a|b", "c"]);
        assert!(matches!(
            QuizBank::new(vec![question]),
            Err(CatalogError::SeparatorInOption { .. })
        ));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        // Cyrillic is two bytes per letter, so short labels still overflow
        let question = QuizQuestion::new(
            "Как называется этот трофей?",
            "Кубок Чемпионов",
            &["Кубок Чемпионов", "Трофей Победы", "Спортивная Медаль"],
        );
        match QuizBank::new(vec![question]) {
            Err(CatalogError::PayloadTooLong { bytes, .. }) => {
                assert!(bytes > MAX_PAYLOAD_BYTES)
            }
            other => panic!("expected PayloadTooLong, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_default_questions_fit_payload_limit() {
        assert!(QuizBank::new(trophy_common::default_questions()).is_ok());
    }

    #[test]
    fn test_draw_covers_every_question() {
        let bank = QuizBank::new(trophy_common::default_questions()).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = vec![false; bank.questions().len()];

        for _ in 0..200 {
            let drawn = bank.draw_with(&mut rng);
            let index = bank.questions().iter().position(|q| q == drawn).unwrap();
            seen[index] = true;
        }

        assert!(seen.iter().all(|s| *s));
        assert!(bank.questions().contains(bank.draw_one()));
    }
}
