mod ids;
mod input;
mod item;
mod member;
mod outcome;
mod settings;
mod summary;
mod variant;

pub use ids::{CollectionId, ItemId, MemberId, ParseIdError, SessionId};
pub use input::AnswerInput;
pub use item::{BLANK_MARKER, ExpectedAnswer, ItemError, QuizItem};
pub use member::Member;
pub use outcome::{AnswerRecord, Outcome};
pub use settings::{HintPolicy, QuizSettings, SettingsError};
pub use summary::{SessionSummary, SessionSummaryError};
pub use variant::QuizVariant;
