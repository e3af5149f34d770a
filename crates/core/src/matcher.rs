//! Answer comparison strategies, one per quiz shape.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{AnswerInput, QuizItem};
use crate::normalize::equivalent;

/// Why an input could not be evaluated. Rejected input never mutates a session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputError {
    #[error("fill in every blank before submitting")]
    Incomplete,

    #[error("this kind of answer does not fit the current item")]
    UnexpectedShape,

    #[error("expected {expected} blanks, got {provided}")]
    BlankCount { expected: usize, provided: usize },

    #[error("choice {index} does not exist")]
    UnknownChoice { index: usize },

    #[error("choice {index} was picked more than once")]
    DuplicateChoice { index: usize },
}

/// Normalise-and-compare strategy used by the session controller.
pub trait AnswerMatcher: Send + Sync {
    /// Returns whether `input` answers `item` correctly.
    ///
    /// # Errors
    ///
    /// Returns `InputError` when the input is incomplete or shaped for a different item.
    fn check(&self, item: &QuizItem, input: &AnswerInput) -> Result<bool, InputError>;
}

/// Free text compared against the whole answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizedTextMatcher;

impl AnswerMatcher for NormalizedTextMatcher {
    fn check(&self, item: &QuizItem, input: &AnswerInput) -> Result<bool, InputError> {
        let expected = item.expected().joined();
        match input {
            AnswerInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err(InputError::Incomplete);
                }
                Ok(equivalent(text, &expected))
            }
            AnswerInput::Blanks(blanks) => {
                if blanks.iter().any(|b| b.trim().is_empty()) {
                    return Err(InputError::Incomplete);
                }
                Ok(equivalent(&blanks.join(" "), &expected))
            }
            AnswerInput::Choices(_) => Err(InputError::UnexpectedShape),
        }
    }
}

/// Each blank checked against its own token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerBlankMatcher;

impl AnswerMatcher for PerBlankMatcher {
    fn check(&self, item: &QuizItem, input: &AnswerInput) -> Result<bool, InputError> {
        let expected = item.expected();
        match input {
            AnswerInput::Blanks(blanks) => {
                if blanks.len() != expected.blank_count() {
                    return Err(InputError::BlankCount {
                        expected: expected.blank_count(),
                        provided: blanks.len(),
                    });
                }
                if blanks.iter().any(|b| b.trim().is_empty()) {
                    return Err(InputError::Incomplete);
                }
                Ok(blanks
                    .iter()
                    .enumerate()
                    .all(|(i, typed)| expected.blank(i).is_some_and(|want| equivalent(typed, want))))
            }
            AnswerInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err(InputError::Incomplete);
                }
                Ok(equivalent(text, &expected.joined()))
            }
            AnswerInput::Choices(_) => Err(InputError::UnexpectedShape),
        }
    }
}

/// Picked chips, in order, compared against the sentence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceSequenceMatcher;

impl AnswerMatcher for ChoiceSequenceMatcher {
    fn check(&self, item: &QuizItem, input: &AnswerInput) -> Result<bool, InputError> {
        let expected = item.expected();
        match input {
            AnswerInput::Choices(picked) => {
                if picked.len() < expected.blank_count() {
                    return Err(InputError::Incomplete);
                }
                let choices = item.choices();
                let mut seen = HashSet::with_capacity(picked.len());
                let mut words = Vec::with_capacity(picked.len());
                for &index in picked {
                    let token = choices
                        .get(index)
                        .ok_or(InputError::UnknownChoice { index })?;
                    if !seen.insert(index) {
                        return Err(InputError::DuplicateChoice { index });
                    }
                    words.push(token.as_str());
                }
                Ok(equivalent(&words.join(" "), &expected.joined()))
            }
            AnswerInput::Text(text) => {
                if text.trim().is_empty() {
                    return Err(InputError::Incomplete);
                }
                Ok(equivalent(text, &expected.joined()))
            }
            AnswerInput::Blanks(_) => Err(InputError::UnexpectedShape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn text_matcher_ignores_punctuation_and_spacing() {
        let item = QuizItem::blank(ItemId::new(1), "___", "apple").unwrap();
        let m = NormalizedTextMatcher;
        assert!(m.check(&item, &AnswerInput::Text(" apple. ".into())).unwrap());
        assert!(!m.check(&item, &AnswerInput::Text("apples".into())).unwrap());
        assert_eq!(
            m.check(&item, &AnswerInput::Text("  ".into())).unwrap_err(),
            InputError::Incomplete
        );
        assert_eq!(
            m.check(&item, &AnswerInput::Choices(vec![0])).unwrap_err(),
            InputError::UnexpectedShape
        );
    }

    #[test]
    fn blank_matcher_checks_each_blank() {
        let item =
            QuizItem::phrase(ItemId::new(2), "I ___ ___ it", strings(&["made", "up"])).unwrap();
        let m = PerBlankMatcher;
        assert!(m
            .check(&item, &AnswerInput::Blanks(strings(&["made", "up."])))
            .unwrap());
        assert!(!m
            .check(&item, &AnswerInput::Blanks(strings(&["up", "made"])))
            .unwrap());
        assert_eq!(
            m.check(&item, &AnswerInput::Blanks(strings(&["made", ""])))
                .unwrap_err(),
            InputError::Incomplete
        );
        assert_eq!(
            m.check(&item, &AnswerInput::Blanks(strings(&["made"])))
                .unwrap_err(),
            InputError::BlankCount {
                expected: 2,
                provided: 1
            }
        );
        assert!(m.check(&item, &AnswerInput::Text("made up".into())).unwrap());
    }

    #[test]
    fn choice_matcher_joins_picked_tokens_in_order() {
        let item = QuizItem::sentence(
            ItemId::new(3),
            "Arrange",
            strings(&["I", "am", "happy."]),
            strings(&["happy.", "am", "I", "was"]),
        )
        .unwrap();
        let m = ChoiceSequenceMatcher;
        assert!(m.check(&item, &AnswerInput::Choices(vec![2, 1, 0])).unwrap());
        assert!(!m.check(&item, &AnswerInput::Choices(vec![2, 3, 0])).unwrap());
        assert_eq!(
            m.check(&item, &AnswerInput::Choices(vec![2])).unwrap_err(),
            InputError::Incomplete
        );
        assert_eq!(
            m.check(&item, &AnswerInput::Choices(vec![2, 9, 0])).unwrap_err(),
            InputError::UnknownChoice { index: 9 }
        );
        assert_eq!(
            m.check(&item, &AnswerInput::Choices(vec![2, 2, 0])).unwrap_err(),
            InputError::DuplicateChoice { index: 2 }
        );
    }
}
