use thiserror::Error;

use crate::model::ids::ItemId;

/// Marker for a fill-in blank inside a prompt template.
pub const BLANK_MARKER: &str = "___";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("expected answer cannot be empty")]
    EmptyAnswer,

    #[error("answer token {index} is empty")]
    EmptyToken { index: usize },

    #[error("prompt has {markers} blank markers but the answer has {blanks} blanks")]
    BlankCountMismatch { markers: usize, blanks: usize },

    #[error("sentence items need at least one choice")]
    MissingChoices,

    #[error("answer token {token:?} is not among the choices")]
    TokenNotInChoices { token: String },
}

//
// ─── EXPECTED ANSWER ───────────────────────────────────────────────────────────
//

/// What the learner must produce for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedAnswer {
    /// A single word or phrase typed into one blank.
    Text(String),
    /// Ordered tokens, one per blank (phrase items) or per chosen chip (sentence items).
    Tokens(Vec<String>),
}

impl ExpectedAnswer {
    /// The full answer as a single string, tokens joined by one space.
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            ExpectedAnswer::Text(text) => text.clone(),
            ExpectedAnswer::Tokens(tokens) => tokens.join(" "),
        }
    }

    #[must_use]
    pub fn blank_count(&self) -> usize {
        match self {
            ExpectedAnswer::Text(_) => 1,
            ExpectedAnswer::Tokens(tokens) => tokens.len(),
        }
    }

    /// Expected text for the blank at `index`.
    #[must_use]
    pub fn blank(&self, index: usize) -> Option<&str> {
        match self {
            ExpectedAnswer::Text(text) if index == 0 => Some(text),
            ExpectedAnswer::Text(_) => None,
            ExpectedAnswer::Tokens(tokens) => tokens.get(index).map(String::as_str),
        }
    }

    fn validate(&self) -> Result<(), ItemError> {
        match self {
            ExpectedAnswer::Text(text) if text.trim().is_empty() => Err(ItemError::EmptyAnswer),
            ExpectedAnswer::Text(_) => Ok(()),
            ExpectedAnswer::Tokens(tokens) if tokens.is_empty() => Err(ItemError::EmptyAnswer),
            ExpectedAnswer::Tokens(tokens) => tokens
                .iter()
                .position(|t| t.trim().is_empty())
                .map_or(Ok(()), |index| Err(ItemError::EmptyToken { index })),
        }
    }
}

//
// ─── QUIZ ITEM ─────────────────────────────────────────────────────────────────
//

/// One question unit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizItem {
    id: ItemId,
    prompt: String,
    expected: ExpectedAnswer,
    choices: Option<Vec<String>>,
    meaning: Option<String>,
    translation: Option<String>,
}

impl QuizItem {
    /// Single-blank word item.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if the answer is empty or the prompt has more than one blank.
    pub fn blank(
        id: ItemId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, ItemError> {
        Self::build(id, prompt.into(), ExpectedAnswer::Text(answer.into()), None)
    }

    /// Multi-blank phrase item; one token per blank marker.
    ///
    /// # Errors
    ///
    /// Returns `ItemError` if a token is empty or the marker count does not line up.
    pub fn phrase(
        id: ItemId,
        prompt: impl Into<String>,
        tokens: Vec<String>,
    ) -> Result<Self, ItemError> {
        Self::build(id, prompt.into(), ExpectedAnswer::Tokens(tokens), None)
    }

    /// Sentence reconstruction from a set of (usually shuffled) choices.
    ///
    /// # Errors
    ///
    /// Returns `ItemError::MissingChoices` for an empty choice set and
    /// `ItemError::TokenNotInChoices` when the choices cannot spell the answer.
    pub fn sentence(
        id: ItemId,
        prompt: impl Into<String>,
        tokens: Vec<String>,
        choices: Vec<String>,
    ) -> Result<Self, ItemError> {
        if choices.is_empty() {
            return Err(ItemError::MissingChoices);
        }
        let mut pool = choices.clone();
        for token in &tokens {
            match pool.iter().position(|c| c == token) {
                Some(at) => {
                    pool.swap_remove(at);
                }
                None => {
                    return Err(ItemError::TokenNotInChoices {
                        token: token.clone(),
                    });
                }
            }
        }
        Self::build(
            id,
            prompt.into(),
            ExpectedAnswer::Tokens(tokens),
            Some(choices),
        )
    }

    fn build(
        id: ItemId,
        prompt: String,
        expected: ExpectedAnswer,
        choices: Option<Vec<String>>,
    ) -> Result<Self, ItemError> {
        expected.validate()?;
        // Sentence items are assembled from chips, so their prompt is free text.
        if choices.is_none() {
            let markers = prompt.matches(BLANK_MARKER).count();
            let blanks = expected.blank_count();
            if markers != 0 && markers != blanks {
                return Err(ItemError::BlankCountMismatch { markers, blanks });
            }
        }
        Ok(Self {
            id,
            prompt,
            expected,
            choices,
            meaning: None,
            translation: None,
        })
    }

    #[must_use]
    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.translation = Some(translation.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn expected(&self) -> &ExpectedAnswer {
        &self.expected
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        self.choices.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn is_choice_based(&self) -> bool {
        self.choices.is_some()
    }

    #[must_use]
    pub fn meaning(&self) -> Option<&str> {
        self.meaning.as_deref()
    }

    #[must_use]
    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }
}
