use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use quiz_core::model::{AnswerInput, AnswerRecord, Member, QuizSettings, QuizVariant};
use storage::repository::{AnswerSink, ItemRequest, QuizItemSource};

use super::controller::{HintResult, QuizSession, SubmitResult};
use crate::Clock;
use crate::error::{QuizServiceError, SessionError};

/// Result of a submission plus the in-flight persistence of its record.
#[derive(Debug)]
pub struct AnswerSubmission {
    pub result: SubmitResult,
    pub persist: PersistHandle,
}

/// Result of a hint plus persistence when the hint decided the item.
#[derive(Debug)]
pub struct HintSubmission {
    pub result: HintResult,
    pub persist: Option<PersistHandle>,
}

/// Fire-and-forget persistence of one answer record.
///
/// The session never waits on it; callers that care (tests, shutdown) can
/// `join` it. Failures are logged, never surfaced.
#[derive(Debug, Default)]
pub struct PersistHandle {
    task: Option<JoinHandle<()>>,
}

impl PersistHandle {
    /// Handle for a record that could not be dispatched.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_dispatched(&self) -> bool {
        self.task.is_some()
    }

    /// Wait for the background write to finish.
    pub async fn join(self) {
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}

/// Item fetch running in the background.
///
/// Dropping it cancels the fetch, so a screen that closes early never
/// receives a session.
#[derive(Debug)]
pub struct PendingSession {
    task: Option<JoinHandle<Result<QuizSession, QuizServiceError>>>,
}

impl PendingSession {
    /// Wait for the session to become ready.
    ///
    /// # Errors
    ///
    /// Returns the fetch or session error, `QuizServiceError::Cancelled` if
    /// the fetch was cancelled, or `QuizServiceError::Task` if it panicked.
    pub async fn wait(mut self) -> Result<QuizSession, QuizServiceError> {
        let Some(task) = self.task.take() else {
            return Err(QuizServiceError::Cancelled);
        };
        match task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(QuizServiceError::Cancelled),
            Err(err) => Err(QuizServiceError::Task(err.to_string())),
        }
    }

    /// Abort the fetch.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("session fetch cancelled");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PendingSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Orchestrates session start and persisted answering.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    items: Arc<dyn QuizItemSource>,
    results: Arc<dyn AnswerSink>,
    seed: Option<u64>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, items: Arc<dyn QuizItemSource>, results: Arc<dyn AnswerSink>) -> Self {
        Self {
            clock,
            items,
            results,
            seed: None,
        }
    }

    /// Seed item shuffling and free letters for reproducible sessions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fetch items for `request` and start a session.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Fetch` if the source fails and
    /// `QuizServiceError::Session` if the items cannot form a session.
    pub async fn start_session(
        &self,
        member: &Member,
        request: ItemRequest,
        settings: QuizSettings,
    ) -> Result<QuizSession, QuizServiceError> {
        let items = self
            .items
            .fetch_items(member, &request)
            .await
            .inspect_err(|err| {
                warn!(
                    member = %member.id(),
                    variant = %request.variant,
                    collection = %request.collection,
                    error = %err,
                    "failed to fetch quiz items"
                );
            })?;
        info!(
            member = %member.id(),
            variant = %request.variant,
            collection = %request.collection,
            items = items.len(),
            "quiz items loaded"
        );

        let session = match self.seed {
            Some(seed) => QuizSession::new_seeded(
                member.id(),
                request.variant,
                settings,
                items,
                self.clock,
                seed,
            ),
            None => QuizSession::new(member.id(), request.variant, settings, items, self.clock),
        }?;
        Ok(session)
    }

    /// Start a session with the variant's default settings.
    ///
    /// # Errors
    ///
    /// Same as [`QuizLoopService::start_session`].
    pub async fn start_default(
        &self,
        member: &Member,
        request: ItemRequest,
    ) -> Result<QuizSession, QuizServiceError> {
        let settings = QuizSettings::for_variant(request.variant);
        self.start_session(member, request, settings).await
    }

    /// Start a session in the background; drop or cancel the handle to abandon it.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn_session(
        &self,
        member: Member,
        request: ItemRequest,
        settings: QuizSettings,
    ) -> PendingSession {
        let service = self.clone();
        let task = tokio::spawn(async move {
            service.start_session(&member, request, settings).await
        });
        PendingSession { task: Some(task) }
    }

    /// Submit `input` for the current item and persist the record in the background.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session rejects the input.
    pub fn submit(
        &self,
        member: &Member,
        session: &mut QuizSession,
        input: AnswerInput,
    ) -> Result<AnswerSubmission, SessionError> {
        let result = session.submit(input)?;
        let persist = self.persist(member, session.variant(), result.record);
        Ok(AnswerSubmission { result, persist })
    }

    /// Request a hint; persists the record when the hint decided the item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if no hint is available.
    pub fn hint(
        &self,
        member: &Member,
        session: &mut QuizSession,
    ) -> Result<HintSubmission, SessionError> {
        let result = session.hint()?;
        let persist = result
            .record
            .map(|record| self.persist(member, session.variant(), record));
        Ok(HintSubmission { result, persist })
    }

    /// Hand `record` to the result sink without waiting for it.
    ///
    /// Outside a Tokio runtime the record is dropped with a warning.
    #[must_use]
    pub fn persist(
        &self,
        member: &Member,
        variant: QuizVariant,
        record: AnswerRecord,
    ) -> PersistHandle {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(item = %record.item_id, "no runtime available, answer result not persisted");
            return PersistHandle::detached();
        };
        let sink = Arc::clone(&self.results);
        let member = member.clone();
        let task = runtime.spawn(async move {
            match sink.submit_result(&member, variant, record).await {
                Ok(()) => debug!(
                    member = %member.id(),
                    item = %record.item_id,
                    correct = record.correct,
                    "answer result persisted"
                ),
                Err(err) => warn!(
                    member = %member.id(),
                    item = %record.item_id,
                    error = %err,
                    "failed to persist answer result"
                ),
            }
        });
        PersistHandle { task: Some(task) }
    }
}
