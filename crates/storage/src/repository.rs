use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerRecord, CollectionId, ItemError, ItemId, Member, MemberId, QuizItem, QuizVariant,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by item sources and result sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("item {id} is invalid: {source}")]
    InvalidItem { id: ItemId, source: ItemError },

    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Which item set a quiz screen asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRequest {
    pub variant: QuizVariant,
    pub collection: CollectionId,
}

impl ItemRequest {
    #[must_use]
    pub fn new(variant: QuizVariant, collection: CollectionId) -> Self {
        Self {
            variant,
            collection,
        }
    }
}

/// Provides the ordered item list for a quiz session.
#[async_trait]
pub trait QuizItemSource: Send + Sync {
    /// Fetch the items for `request` on behalf of `member`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the set does not exist, or
    /// transport/validation errors.
    async fn fetch_items(
        &self,
        member: &Member,
        request: &ItemRequest,
    ) -> Result<Vec<QuizItem>, StorageError>;
}

/// Receives one result per answered item.
#[async_trait]
pub trait AnswerSink: Send + Sync {
    /// Persist a single answer result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn submit_result(
        &self,
        member: &Member,
        variant: QuizVariant,
        record: AnswerRecord,
    ) -> Result<(), StorageError>;
}

/// A result as captured by [`InMemoryRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResult {
    pub member_id: MemberId,
    pub variant: QuizVariant,
    pub record: AnswerRecord,
    pub received_at: DateTime<Utc>,
}

/// In-memory item source and result sink for tests and offline practice.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    items: Arc<Mutex<HashMap<ItemRequest, Vec<QuizItem>>>>,
    results: Arc<Mutex<Vec<StoredResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the item set served for `request`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn put_items(
        &self,
        request: ItemRequest,
        items: Vec<QuizItem>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(request, items);
        Ok(())
    }

    /// Results received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn results(&self) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl QuizItemSource for InMemoryRepository {
    async fn fetch_items(
        &self,
        _member: &Member,
        request: &ItemRequest,
    ) -> Result<Vec<QuizItem>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(request).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AnswerSink for InMemoryRepository {
    async fn submit_result(
        &self,
        member: &Member,
        variant: QuizVariant,
        record: AnswerRecord,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(StoredResult {
            member_id: member.id(),
            variant,
            record,
            received_at: Utc::now(),
        });
        Ok(())
    }
}

/// Item source and result sink behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn QuizItemSource>,
    pub results: Arc<dyn AnswerSink>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> (Self, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let items: Arc<dyn QuizItemSource> = Arc::new(repo.clone());
        let results: Arc<dyn AnswerSink> = Arc::new(repo.clone());
        (Self { items, results }, repo)
    }
}
