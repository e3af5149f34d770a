use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ledger::ResultLedger;
use crate::model::{MemberId, QuizVariant, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("ledger still has {unanswered} unanswered items")]
    Incomplete { unanswered: usize },

    #[error("too many items for a single session: {len}")]
    TooManyItems { len: usize },
}

/// Final result of a completed quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    session_id: SessionId,
    member_id: MemberId,
    variant: QuizVariant,
    attempt: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: u32,
    correct: u32,
    incorrect_positions: Vec<usize>,
}

impl SessionSummary {
    /// Build a summary from a completed ledger.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`,
    /// `Incomplete` if any position is still unanswered, and `TooManyItems` if the
    /// item count cannot fit in `u32`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_ledger(
        session_id: SessionId,
        member_id: MemberId,
        variant: QuizVariant,
        attempt: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        ledger: &ResultLedger,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        let unanswered = ledger.len() - ledger.answered_count();
        if unanswered > 0 {
            return Err(SessionSummaryError::Incomplete { unanswered });
        }
        let total = u32::try_from(ledger.len())
            .map_err(|_| SessionSummaryError::TooManyItems { len: ledger.len() })?;
        let correct = u32::try_from(ledger.score())
            .map_err(|_| SessionSummaryError::TooManyItems { len: ledger.len() })?;

        Ok(Self {
            session_id,
            member_id,
            variant,
            attempt,
            started_at,
            completed_at,
            total,
            correct,
            incorrect_positions: ledger.incorrect_positions().into_iter().collect(),
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    #[must_use]
    pub fn variant(&self) -> QuizVariant {
        self.variant
    }

    /// 1 for the first run, incremented by each retry of incorrect items.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.total - self.correct
    }

    /// Positions (in this session's item order) that ended incorrect.
    #[must_use]
    pub fn incorrect_positions(&self) -> &[usize] {
        &self.incorrect_positions
    }

    /// Share of correct items in `[0, 1]`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.total)
    }
}
