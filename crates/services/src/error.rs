//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::ledger::LedgerError;
use quiz_core::matcher::InputError;
use quiz_core::model::{ItemId, QuizVariant, SessionSummaryError};
use storage::StorageError;

/// Errors emitted by the session controller.
///
/// None of these mutate the session; the UI shows them as transient notices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no items available for session")]
    Empty,
    #[error("item {item_id} does not fit a {variant} quiz")]
    ItemShape { item_id: ItemId, variant: QuizVariant },
    #[error("session already completed")]
    Completed,
    #[error("session is not completed yet")]
    NotCompleted,
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("item already answered correctly")]
    AlreadyAnswered,
    #[error("item {position} is locked after using every hint")]
    ItemLocked { position: usize },
    #[error("hints are not available for this item")]
    HintUnavailable,
    #[error("final result is only available on the last item")]
    NotAtLastItem,
    #[error("no incorrect items to retry")]
    NothingToRetry,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("could not load quiz items: {0}")]
    Fetch(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("loading was cancelled")]
    Cancelled,
    #[error("loading task failed: {0}")]
    Task(String),
}
