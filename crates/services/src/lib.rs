#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::{AppServices, ItemSourceConfig};
pub use error::{QuizServiceError, SessionError};

pub use sessions::{
    AnswerSubmission, AutoResetTimer, HintResult, HintSubmission, PendingSession,
    PersistHandle, QuizLoopService, QuizSession, ResetTicket, SessionPhase, SessionProgress,
    SessionSnapshot, SubmitResult,
};
