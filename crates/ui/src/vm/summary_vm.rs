use quiz_core::model::{QuizItem, SessionSummary};
use services::QuizSession;

use crate::vm::time_fmt::{format_datetime, format_percent};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissedItemVm {
    pub prompt: String,
    pub answer: String,
    pub meaning: Option<String>,
}

impl From<&QuizItem> for MissedItemVm {
    fn from(item: &QuizItem) -> Self {
        Self {
            prompt: item.prompt().to_owned(),
            answer: item.expected().joined(),
            meaning: item.meaning().map(str::to_owned),
        }
    }
}

/// Final result screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryVm {
    pub variant: &'static str,
    pub attempt: u32,
    pub score: u32,
    pub total: u32,
    pub accuracy_str: String,
    pub completed_at_str: String,
    pub missed: Vec<MissedItemVm>,
    pub can_retry: bool,
}

impl SummaryVm {
    #[must_use]
    pub fn new(summary: &SessionSummary, items: &[QuizItem]) -> Self {
        let missed: Vec<MissedItemVm> = summary
            .incorrect_positions()
            .iter()
            .filter_map(|&p| items.get(p))
            .map(MissedItemVm::from)
            .collect();
        Self {
            variant: summary.variant().as_str(),
            attempt: summary.attempt(),
            score: summary.score(),
            total: summary.total(),
            accuracy_str: format_percent(summary.accuracy()),
            completed_at_str: format_datetime(summary.completed_at()),
            can_retry: !missed.is_empty(),
            missed,
        }
    }

    /// `None` until the session is finalized.
    #[must_use]
    pub fn from_session(session: &QuizSession) -> Option<Self> {
        session
            .summary()
            .ok()
            .map(|summary| Self::new(&summary, session.items()))
    }
}
