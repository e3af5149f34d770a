#![forbid(unsafe_code)]

//! Collaborator seams for quiz sessions: where items come from and where
//! per-answer results go.

pub mod file_source;
pub mod http;
pub mod records;
pub mod repository;

pub use file_source::JsonFileItemSource;
pub use http::{ApiConfig, HttpQuizApi};
pub use repository::{
    AnswerSink, InMemoryRepository, ItemRequest, QuizItemSource, Storage, StorageError,
    StoredResult,
};
