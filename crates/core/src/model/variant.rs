use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matcher::{
    AnswerMatcher, ChoiceSequenceMatcher, NormalizedTextMatcher, PerBlankMatcher,
};
use crate::render::{BlankTemplateRenderer, ChoiceRenderer, ItemRenderer};

/// The three quiz screens, each a pairing of matcher, renderer, and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizVariant {
    /// Single word typed into one blank.
    Word,
    /// Multi-word expression, one blank per word.
    Expression,
    /// Sentence rebuilt from shuffled chips.
    Grammar,
}

static TEXT_MATCHER: NormalizedTextMatcher = NormalizedTextMatcher;
static BLANK_MATCHER: PerBlankMatcher = PerBlankMatcher;
static CHOICE_MATCHER: ChoiceSequenceMatcher = ChoiceSequenceMatcher;
static TEMPLATE_RENDERER: BlankTemplateRenderer = BlankTemplateRenderer;
static CHOICE_RENDERER: ChoiceRenderer = ChoiceRenderer;

impl QuizVariant {
    pub const ALL: [QuizVariant; 3] = [Self::Word, Self::Expression, Self::Grammar];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Expression => "expression",
            Self::Grammar => "grammar",
        }
    }

    #[must_use]
    pub fn matcher(self) -> &'static dyn AnswerMatcher {
        match self {
            Self::Word => &TEXT_MATCHER,
            Self::Expression => &BLANK_MATCHER,
            Self::Grammar => &CHOICE_MATCHER,
        }
    }

    #[must_use]
    pub fn renderer(self) -> &'static dyn ItemRenderer {
        match self {
            Self::Word | Self::Expression => &TEMPLATE_RENDERER,
            Self::Grammar => &CHOICE_RENDERER,
        }
    }
}

impl fmt::Display for QuizVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "expression" => Ok(Self::Expression),
            "grammar" => Ok(Self::Grammar),
            other => Err(format!("unknown quiz variant: {other}")),
        }
    }
}
