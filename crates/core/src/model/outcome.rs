use serde::{Deserialize, Serialize};

use crate::model::ids::ItemId;

/// Result of one item within a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

impl Outcome {
    #[must_use]
    pub fn from_correct(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

/// Best-effort record sent to the persistence collaborator per answered item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub item_id: ItemId,
    pub correct: bool,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(item_id: ItemId, outcome: Outcome) -> Self {
        Self {
            item_id,
            correct: matches!(outcome, Outcome::Correct),
        }
    }
}
