use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::{AnswerSink, InMemoryRepository, QuizItemSource, Storage};
use storage::{ApiConfig, HttpQuizApi, JsonFileItemSource};
use tracing::info;

use crate::Clock;
use crate::sessions::QuizLoopService;

/// Where quiz items come from and answer results go.
#[derive(Debug, Clone)]
pub enum ItemSourceConfig {
    /// Remote quiz API for both items and results.
    Http(ApiConfig),
    /// Items from a local JSON file; results are kept in memory.
    File(PathBuf),
    /// Everything in memory, seeded by the caller.
    InMemory(InMemoryRepository),
}

/// Assembles app-facing services.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    local_results: Option<InMemoryRepository>,
}

impl AppServices {
    #[must_use]
    pub fn new(source: ItemSourceConfig, clock: Clock) -> Self {
        Self::with_seed(source, clock, None)
    }

    /// Like [`AppServices::new`] with deterministic shuffling when `seed` is set.
    #[must_use]
    pub fn with_seed(source: ItemSourceConfig, clock: Clock, seed: Option<u64>) -> Self {
        let (storage, local_results) = match source {
            ItemSourceConfig::Http(config) => {
                info!(base_url = %config.base_url, "using remote quiz api");
                let api = Arc::new(HttpQuizApi::new(config));
                let items: Arc<dyn QuizItemSource> = api.clone();
                let results: Arc<dyn AnswerSink> = api;
                (Storage { items, results }, None)
            }
            ItemSourceConfig::File(path) => {
                info!(path = %path.display(), "using local items file");
                let repo = InMemoryRepository::new();
                let items: Arc<dyn QuizItemSource> = Arc::new(JsonFileItemSource::new(path));
                let results: Arc<dyn AnswerSink> = Arc::new(repo.clone());
                (Storage { items, results }, Some(repo))
            }
            ItemSourceConfig::InMemory(repo) => {
                let items: Arc<dyn QuizItemSource> = Arc::new(repo.clone());
                let results: Arc<dyn AnswerSink> = Arc::new(repo.clone());
                (Storage { items, results }, Some(repo))
            }
        };

        let mut quiz_loop = QuizLoopService::new(clock, storage.items, storage.results);
        if let Some(seed) = seed {
            quiz_loop = quiz_loop.with_seed(seed);
        }

        Self {
            quiz_loop: Arc::new(quiz_loop),
            local_results,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    /// Results captured locally when no remote sink is configured.
    #[must_use]
    pub fn local_results(&self) -> Option<&InMemoryRepository> {
        self.local_results.as_ref()
    }
}
