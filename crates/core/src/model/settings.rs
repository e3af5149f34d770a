use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::variant::QuizVariant;

/// Upper bound for the per-item hint budget.
pub const MAX_HINT_BUDGET: u32 = 10;

/// Default delay before an incorrect answer is cleared for another attempt.
pub const DEFAULT_AUTO_RESET_MS: u32 = 1_500;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("hint budget must be at most {MAX_HINT_BUDGET}, got {provided}")]
    InvalidHintBudget { provided: u32 },

    #[error("auto reset delay must be between 200 and 10000 ms, got {provided}")]
    InvalidAutoResetDelay { provided: u32 },

    #[error("a free starting letter needs a hint-based quiz (hint budget > 0)")]
    FreebieWithoutHints,
}

//
// ─── HINT POLICY ───────────────────────────────────────────────────────────────
//

/// What happens once an item's hint budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintPolicy {
    /// The item stays open; a later correct submission still counts.
    AllowRecovery,
    /// Spending the last hint records the item as incorrect and locks it.
    ForceIncorrect,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Per-session quiz configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    max_hints: u32,
    hint_policy: HintPolicy,
    auto_reset_ms: Option<u32>,
    seed_freebie: bool,
    advance_on_correct: bool,
    shuffle_items: bool,
}

impl QuizSettings {
    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the hint budget or reset delay is out of range,
    /// or a free starting letter is requested without hints.
    pub fn new(
        max_hints: u32,
        hint_policy: HintPolicy,
        auto_reset_ms: Option<u32>,
        seed_freebie: bool,
        advance_on_correct: bool,
        shuffle_items: bool,
    ) -> Result<Self, SettingsError> {
        if max_hints > MAX_HINT_BUDGET {
            return Err(SettingsError::InvalidHintBudget {
                provided: max_hints,
            });
        }
        if let Some(ms) = auto_reset_ms {
            if !(200..=10_000).contains(&ms) {
                return Err(SettingsError::InvalidAutoResetDelay { provided: ms });
            }
        }
        if seed_freebie && max_hints == 0 {
            return Err(SettingsError::FreebieWithoutHints);
        }
        Ok(Self {
            max_hints,
            hint_policy,
            auto_reset_ms,
            seed_freebie,
            advance_on_correct,
            shuffle_items,
        })
    }

    /// Defaults for each quiz screen.
    ///
    /// - Word: 3 hints that never lock the item, one free letter, advance on correct.
    /// - Expression: 3 hints, the last one locks the item as incorrect; wrong
    ///   answers clear after 1.5s.
    /// - Grammar: no hints; wrong answers clear after 1.5s.
    #[must_use]
    pub fn for_variant(variant: QuizVariant) -> Self {
        match variant {
            QuizVariant::Word => Self {
                max_hints: 3,
                hint_policy: HintPolicy::AllowRecovery,
                auto_reset_ms: None,
                seed_freebie: true,
                advance_on_correct: true,
                shuffle_items: false,
            },
            QuizVariant::Expression => Self {
                max_hints: 3,
                hint_policy: HintPolicy::ForceIncorrect,
                auto_reset_ms: Some(DEFAULT_AUTO_RESET_MS),
                seed_freebie: false,
                advance_on_correct: false,
                shuffle_items: false,
            },
            QuizVariant::Grammar => Self {
                max_hints: 0,
                hint_policy: HintPolicy::AllowRecovery,
                auto_reset_ms: Some(DEFAULT_AUTO_RESET_MS),
                seed_freebie: false,
                advance_on_correct: false,
                shuffle_items: false,
            },
        }
    }

    #[must_use]
    pub fn with_shuffle_items(mut self, shuffle: bool) -> Self {
        self.shuffle_items = shuffle;
        self
    }

    #[must_use]
    pub fn max_hints(&self) -> u32 {
        self.max_hints
    }

    #[must_use]
    pub fn hint_policy(&self) -> HintPolicy {
        self.hint_policy
    }

    #[must_use]
    pub fn auto_reset_delay(&self) -> Option<Duration> {
        self.auto_reset_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    #[must_use]
    pub fn seed_freebie(&self) -> bool {
        self.seed_freebie
    }

    #[must_use]
    pub fn advance_on_correct(&self) -> bool {
        self.advance_on_correct
    }

    #[must_use]
    pub fn shuffle_items(&self) -> bool {
        self.shuffle_items
    }

    #[must_use]
    pub fn hints_enabled(&self) -> bool {
        self.max_hints > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_defaults_are_valid() {
        for variant in QuizVariant::ALL {
            let s = QuizSettings::for_variant(variant);
            let rebuilt = QuizSettings::new(
                s.max_hints,
                s.hint_policy,
                s.auto_reset_ms,
                s.seed_freebie,
                s.advance_on_correct,
                s.shuffle_items,
            )
            .unwrap();
            assert_eq!(rebuilt, s);
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            QuizSettings::new(11, HintPolicy::AllowRecovery, None, false, false, false)
                .unwrap_err(),
            SettingsError::InvalidHintBudget { provided: 11 }
        );
        assert_eq!(
            QuizSettings::new(3, HintPolicy::AllowRecovery, Some(50), false, false, false)
                .unwrap_err(),
            SettingsError::InvalidAutoResetDelay { provided: 50 }
        );
        assert_eq!(
            QuizSettings::new(0, HintPolicy::AllowRecovery, None, true, false, false)
                .unwrap_err(),
            SettingsError::FreebieWithoutHints
        );
    }

    #[test]
    fn expression_quiz_resets_after_delay() {
        let s = QuizSettings::for_variant(QuizVariant::Expression);
        assert_eq!(s.auto_reset_delay(), Some(Duration::from_millis(1_500)));
        assert_eq!(s.hint_policy(), HintPolicy::ForceIncorrect);
        assert!(QuizSettings::for_variant(QuizVariant::Word)
            .auto_reset_delay()
            .is_none());
    }
}
