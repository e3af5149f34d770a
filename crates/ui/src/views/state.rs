use services::{QuizServiceError, SessionError};
use storage::StorageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The collection has no items, or the source does not know it.
    EmptySession,
    /// Items could not be fetched.
    Unavailable,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::EmptySession => "There are no questions in this set yet.",
            Self::Unavailable => "Questions could not be loaded. Please try again later.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<&QuizServiceError> for ViewError {
    fn from(err: &QuizServiceError) -> Self {
        match err {
            QuizServiceError::Session(SessionError::Empty)
            | QuizServiceError::Fetch(StorageError::NotFound) => Self::EmptySession,
            QuizServiceError::Fetch(_) => Self::Unavailable,
            _ => Self::Unknown,
        }
    }
}

/// Lifecycle of a screen backed by an async load.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    /// Nothing requested yet.
    Idle,
    /// Request in flight.
    Loading,
    Ready(T),
    Error(ViewError),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn from_result<E>(result: Result<T, E>) -> Self
    where
        for<'a> ViewError: From<&'a E>,
    {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Error(ViewError::from(&err)),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Placeholder text for every state that has nothing to render yet.
    #[must_use]
    pub fn status_line(&self) -> Option<&'static str> {
        match self {
            Self::Idle | Self::Ready(_) => None,
            Self::Loading => Some("Loading questions..."),
            Self::Error(err) => Some(err.message()),
        }
    }
}

/// State of a finished session load. A cancelled fetch goes back to `Idle`.
#[must_use]
pub fn view_state_from_load<T>(result: Result<T, QuizServiceError>) -> ViewState<T> {
    match result {
        Err(QuizServiceError::Cancelled) => ViewState::Idle,
        other => ViewState::from_result(other),
    }
}
