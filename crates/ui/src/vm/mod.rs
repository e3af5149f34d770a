mod quiz_vm;
mod summary_vm;
mod time_fmt;

pub use quiz_vm::{
    ChipVm, ItemStatus, QuizIntent, QuizOutcome, QuizScreenVm, QuizVm, start_quiz,
};
pub use summary_vm::{MissedItemVm, SummaryVm};
