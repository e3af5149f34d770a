mod controller;
mod progress;
mod timer;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{
    HintResult, QuizSession, ResetTicket, SessionPhase, SessionSnapshot, SubmitResult,
};
pub use progress::SessionProgress;
pub use timer::AutoResetTimer;
pub use workflow::{
    AnswerSubmission, HintSubmission, PendingSession, PersistHandle, QuizLoopService,
};
