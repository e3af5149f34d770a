//! Wire shapes exchanged with the quiz API and the local items file.

use quiz_core::model::{
    AnswerRecord, CollectionId, ExpectedAnswer, ItemError, ItemId, MemberId, QuizItem,
    QuizVariant,
};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Persisted/transported shape of a quiz item.
///
/// Mirrors `QuizItem` so adapters can (de)serialize without leaking wire
/// concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizItemRecord {
    Blank {
        id: ItemId,
        #[serde(default)]
        prompt: String,
        answer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meaning: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translation: Option<String>,
    },
    Phrase {
        id: ItemId,
        #[serde(default)]
        prompt: String,
        tokens: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meaning: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translation: Option<String>,
    },
    Sentence {
        id: ItemId,
        #[serde(default)]
        prompt: String,
        tokens: Vec<String>,
        choices: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meaning: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translation: Option<String>,
    },
}

impl QuizItemRecord {
    #[must_use]
    pub fn from_item(item: &QuizItem) -> Self {
        let id = item.id();
        let prompt = item.prompt().to_owned();
        let meaning = item.meaning().map(str::to_owned);
        let translation = item.translation().map(str::to_owned);
        match item.expected() {
            ExpectedAnswer::Text(answer) => Self::Blank {
                id,
                prompt,
                answer: answer.clone(),
                meaning,
                translation,
            },
            ExpectedAnswer::Tokens(tokens) if item.is_choice_based() => Self::Sentence {
                id,
                prompt,
                tokens: tokens.clone(),
                choices: item.choices().to_vec(),
                meaning,
                translation,
            },
            ExpectedAnswer::Tokens(tokens) => Self::Phrase {
                id,
                prompt,
                tokens: tokens.clone(),
                meaning,
                translation,
            },
        }
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        match self {
            Self::Blank { id, .. } | Self::Phrase { id, .. } | Self::Sentence { id, .. } => *id,
        }
    }

    /// Convert the record back into a validated domain `QuizItem`.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the record fails item validation.
    pub fn into_item(self) -> Result<QuizItem, ItemError> {
        let (item, meaning, translation) = match self {
            Self::Blank {
                id,
                prompt,
                answer,
                meaning,
                translation,
            } => (QuizItem::blank(id, prompt, answer)?, meaning, translation),
            Self::Phrase {
                id,
                prompt,
                tokens,
                meaning,
                translation,
            } => (QuizItem::phrase(id, prompt, tokens)?, meaning, translation),
            Self::Sentence {
                id,
                prompt,
                tokens,
                choices,
                meaning,
                translation,
            } => (
                QuizItem::sentence(id, prompt, tokens, choices)?,
                meaning,
                translation,
            ),
        };
        let item = match meaning {
            Some(m) => item.with_meaning(m),
            None => item,
        };
        Ok(match translation {
            Some(t) => item.with_translation(t),
            None => item,
        })
    }
}

/// Validate a batch of records, failing on the first invalid one.
///
/// # Errors
///
/// Returns `StorageError::InvalidItem` naming the offending item.
pub fn into_items(records: Vec<QuizItemRecord>) -> Result<Vec<QuizItem>, StorageError> {
    records
        .into_iter()
        .map(|record| {
            let id = record.id();
            record
                .into_item()
                .map_err(|source| StorageError::InvalidItem { id, source })
        })
        .collect()
}

/// One named item set in the local items file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSetRecord {
    pub variant: QuizVariant,
    pub collection: CollectionId,
    pub items: Vec<QuizItemRecord>,
}

/// Body posted to the results endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecordPayload {
    pub member_id: MemberId,
    pub variant: QuizVariant,
    pub item_id: ItemId,
    pub correct: bool,
}

impl AnswerRecordPayload {
    #[must_use]
    pub fn new(member_id: MemberId, variant: QuizVariant, record: AnswerRecord) -> Self {
        Self {
            member_id,
            variant,
            item_id: record.item_id,
            correct: record.correct,
        }
    }
}
