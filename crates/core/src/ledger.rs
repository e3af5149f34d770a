use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::Outcome;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("position {position} is outside a ledger of {len} items")]
    PositionOutOfRange { position: usize, len: usize },
}

/// Per-position outcomes for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLedger {
    outcomes: Vec<Outcome>,
}

impl ResultLedger {
    /// A ledger with every position `Unanswered`.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            outcomes: vec![Outcome::Unanswered; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn outcome(&self, position: usize) -> Option<Outcome> {
        self.outcomes.get(position).copied()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// Overwrites the outcome at `position`; the latest call wins.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::PositionOutOfRange` for a position past the end.
    pub fn record(&mut self, position: usize, outcome: Outcome) -> Result<(), LedgerError> {
        let len = self.outcomes.len();
        let slot = self
            .outcomes
            .get_mut(position)
            .ok_or(LedgerError::PositionOutOfRange { position, len })?;
        *slot = outcome;
        Ok(())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_answered())
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_answered()).count()
    }

    /// Number of positions recorded as `Correct`.
    #[must_use]
    pub fn score(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Correct))
            .count()
    }

    #[must_use]
    pub fn incorrect_positions(&self) -> BTreeSet<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| matches!(o, Outcome::Incorrect))
            .map(|(i, _)| i)
            .collect()
    }

    /// Skipped questions count as wrong: every `Unanswered` becomes `Incorrect`.
    ///
    /// Returns how many positions were forced.
    pub fn force_complete_unanswered(&mut self) -> usize {
        let mut forced = 0;
        for outcome in &mut self.outcomes {
            if !outcome.is_answered() {
                *outcome = Outcome::Incorrect;
                forced += 1;
            }
        }
        forced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_until_every_position_answered() {
        let mut ledger = ResultLedger::new(3);
        assert!(!ledger.is_complete());
        ledger.record(0, Outcome::Correct).unwrap();
        ledger.record(2, Outcome::Incorrect).unwrap();
        assert!(!ledger.is_complete());
        ledger.record(1, Outcome::Correct).unwrap();
        assert!(ledger.is_complete());
    }

    #[test]
    fn later_record_supersedes_earlier() {
        let mut ledger = ResultLedger::new(1);
        ledger.record(0, Outcome::Incorrect).unwrap();
        ledger.record(0, Outcome::Correct).unwrap();
        assert_eq!(ledger.outcome(0), Some(Outcome::Correct));
        assert_eq!(ledger.score(), 1);
    }

    #[test]
    fn out_of_range_record_is_rejected() {
        let mut ledger = ResultLedger::new(2);
        let err = ledger.record(2, Outcome::Correct).unwrap_err();
        assert_eq!(err, LedgerError::PositionOutOfRange { position: 2, len: 2 });
        assert_eq!(ledger, ResultLedger::new(2));
    }

    #[test]
    fn force_complete_marks_skipped_as_incorrect() {
        let mut ledger = ResultLedger::new(3);
        ledger.record(0, Outcome::Correct).unwrap();
        ledger.record(1, Outcome::Incorrect).unwrap();

        assert_eq!(ledger.force_complete_unanswered(), 1);
        assert!(ledger.is_complete());
        assert_eq!(
            ledger.outcomes(),
            &[Outcome::Correct, Outcome::Incorrect, Outcome::Incorrect]
        );
        assert_eq!(ledger.score(), 1);
        assert_eq!(ledger.incorrect_positions(), BTreeSet::from([1, 2]));
        assert_eq!(ledger.force_complete_unanswered(), 0);
    }

    #[test]
    fn score_never_counts_unanswered_or_incorrect() {
        let patterns: [&[Outcome]; 4] = [
            &[],
            &[Outcome::Unanswered, Outcome::Unanswered],
            &[Outcome::Incorrect, Outcome::Correct, Outcome::Unanswered],
            &[Outcome::Correct, Outcome::Correct],
        ];
        for outcomes in patterns {
            let mut ledger = ResultLedger::new(outcomes.len());
            for (i, o) in outcomes.iter().enumerate() {
                ledger.record(i, *o).unwrap();
            }
            let expected = outcomes.iter().filter(|o| **o == Outcome::Correct).count();
            assert_eq!(ledger.score(), expected);
            assert!(ledger.score() <= ledger.len());
        }
    }
}
