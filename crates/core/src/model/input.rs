use std::collections::HashSet;

use crate::matcher::InputError;
use crate::model::item::{ExpectedAnswer, QuizItem};

/// The learner's in-progress answer for the active item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    /// Free text for a single blank.
    Text(String),
    /// One entry per blank of a phrase item.
    Blanks(Vec<String>),
    /// Indices into the item's choices, in the order they were picked.
    Choices(Vec<usize>),
}

impl AnswerInput {
    /// A cleared buffer shaped for `item`.
    #[must_use]
    pub fn empty_for(item: &QuizItem) -> Self {
        if item.is_choice_based() {
            return Self::Choices(Vec::new());
        }
        match item.expected() {
            ExpectedAnswer::Text(_) => Self::Text(String::new()),
            ExpectedAnswer::Tokens(tokens) => Self::Blanks(vec![String::new(); tokens.len()]),
        }
    }

    /// True when nothing has been entered yet.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Blanks(blanks) => blanks.iter().all(|b| b.trim().is_empty()),
            Self::Choices(picked) => picked.is_empty(),
        }
    }

    /// Checks that this buffer can belong to `item`.
    ///
    /// Free text fits every item. Blanks must match the item's blank count,
    /// and picked choices must be distinct and exist on a choice item.
    ///
    /// # Errors
    ///
    /// Returns `InputError::UnexpectedShape`, `BlankCount`, `UnknownChoice`,
    /// or `DuplicateChoice`.
    pub fn fits(&self, item: &QuizItem) -> Result<(), InputError> {
        match self {
            Self::Text(_) => Ok(()),
            Self::Blanks(_) if item.is_choice_based() => Err(InputError::UnexpectedShape),
            Self::Blanks(blanks) => {
                let expected = item.expected().blank_count();
                if blanks.len() == expected {
                    Ok(())
                } else {
                    Err(InputError::BlankCount {
                        expected,
                        provided: blanks.len(),
                    })
                }
            }
            Self::Choices(_) if !item.is_choice_based() => Err(InputError::UnexpectedShape),
            Self::Choices(picked) => {
                let mut seen = HashSet::new();
                for &index in picked {
                    if index >= item.choices().len() {
                        return Err(InputError::UnknownChoice { index });
                    }
                    if !seen.insert(index) {
                        return Err(InputError::DuplicateChoice { index });
                    }
                }
                Ok(())
            }
        }
    }

    /// Text currently sitting in blank `index`.
    #[must_use]
    pub fn blank_text(&self, index: usize) -> Option<&str> {
        match self {
            Self::Text(text) if index == 0 => Some(text),
            Self::Blanks(blanks) => blanks.get(index).map(String::as_str),
            _ => None,
        }
    }
}
