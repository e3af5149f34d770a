use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quiz_core::model::{Member, QuizItem};
use tracing::debug;

use crate::records::{ItemSetRecord, into_items};
use crate::repository::{ItemRequest, QuizItemSource, StorageError};

/// Reads item sets from a local JSON file (an array of [`ItemSetRecord`]).
///
/// The file is re-read on every fetch so edits show up on the next session.
#[derive(Debug, Clone)]
pub struct JsonFileItemSource {
    path: PathBuf,
}

impl JsonFileItemSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ItemSetRecord>, StorageError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl QuizItemSource for JsonFileItemSource {
    async fn fetch_items(
        &self,
        _member: &Member,
        request: &ItemRequest,
    ) -> Result<Vec<QuizItem>, StorageError> {
        let sets = self.load().await?;
        let set = sets
            .into_iter()
            .find(|s| s.variant == request.variant && s.collection == request.collection)
            .ok_or(StorageError::NotFound)?;
        debug!(
            path = %self.path.display(),
            variant = %request.variant,
            collection = %request.collection,
            count = set.items.len(),
            "loaded item set from file"
        );
        into_items(set.items)
    }
}
