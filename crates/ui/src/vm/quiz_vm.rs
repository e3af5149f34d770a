use std::mem;
use std::sync::Arc;

use quiz_core::model::{AnswerInput, Member, Outcome, QuizSettings};
use services::{
    AutoResetTimer, PersistHandle, QuizLoopService, QuizSession, ResetTicket, SessionError,
    SessionPhase,
};
use storage::ItemRequest;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::context::AppContext;
use crate::views::ViewError;
use crate::vm::summary_vm::SummaryVm;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    /// Replace the free-text buffer.
    Type(String),
    FillBlank { index: usize, text: String },
    /// Pick a choice by its 0-based index.
    PickChoice(usize),
    UndoChoice,
    /// Submit whatever is in the buffer.
    Submit,
    /// Parse a typed line into an answer for the current item and submit it.
    Answer(String),
    Hint,
    Next,
    Prev,
    Finalize,
    RetryIncorrect,
    RestartAll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizOutcome {
    Continue,
    Answered(Outcome),
    Completed,
    /// A new attempt replaced the session.
    Restarted,
    /// The intent was refused; see [`QuizScreenVm::notice`].
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Correct,
    Incorrect,
    /// Every hint was used under the strict policy.
    Locked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChipVm {
    /// 1-based number the learner types to pick it.
    pub number: usize,
    pub token: String,
    pub used: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizScreenVm {
    pub variant: &'static str,
    pub position_label: String,
    pub prompt_line: String,
    pub chips: Vec<ChipVm>,
    pub meaning: Option<String>,
    pub translation: Option<String>,
    pub status: ItemStatus,
    pub hints_remaining: Option<u32>,
    pub notice: Option<String>,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_finalize: bool,
    pub is_complete: bool,
}

pub struct QuizVm {
    member: Member,
    quiz_loop: Arc<QuizLoopService>,
    session: QuizSession,
    timer: AutoResetTimer,
    notice: Option<String>,
    writes: Vec<PersistHandle>,
}

impl QuizVm {
    /// Wrap a started session. Auto-reset tickets arrive on the returned receiver
    /// and go back in through [`QuizVm::on_reset`].
    #[must_use]
    pub fn new(ctx: &AppContext, session: QuizSession) -> (Self, UnboundedReceiver<ResetTicket>) {
        let (timer, resets) = AutoResetTimer::channel();
        let vm = Self {
            member: ctx.member().clone(),
            quiz_loop: ctx.quiz_loop(),
            session,
            timer,
            notice: None,
            writes: Vec::new(),
        };
        (vm, resets)
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply `intent`. Rejections leave the session untouched and set a notice.
    pub fn dispatch(&mut self, intent: QuizIntent) -> QuizOutcome {
        self.notice = None;
        match self.apply(intent) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(error = %err, "quiz intent rejected");
                self.notice = Some(err.to_string());
                QuizOutcome::Rejected
            }
        }
    }

    /// Deliver an auto-reset ticket. Returns whether the screen changed.
    pub fn on_reset(&mut self, ticket: ResetTicket) -> bool {
        self.session.apply_auto_reset(ticket)
    }

    /// Result writes that have not been flushed or dropped as finished.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Wait for every result write started so far.
    pub async fn flush(&mut self) {
        for write in mem::take(&mut self.writes) {
            write.join().await;
        }
    }

    #[must_use]
    pub fn screen(&self) -> QuizScreenVm {
        let session = &self.session;
        let item = session.current_item();
        let rendered = session.render();
        let index = session.current_index();

        let status = match session.phase() {
            SessionPhase::Answered(Outcome::Correct) => ItemStatus::Correct,
            SessionPhase::Answered(_) => ItemStatus::Incorrect,
            _ if session.is_locked(index) => ItemStatus::Locked,
            SessionPhase::Completed => match session.ledger().outcome(index) {
                Some(Outcome::Correct) => ItemStatus::Correct,
                _ => ItemStatus::Incorrect,
            },
            SessionPhase::Presenting => ItemStatus::Pending,
        };
        let hints_remaining = (session.settings().hints_enabled() && !item.is_choice_based())
            .then(|| session.hints_remaining());

        QuizScreenVm {
            variant: session.variant().as_str(),
            position_label: session.progress().position_label(),
            prompt_line: rendered.to_plain_text(),
            chips: rendered
                .chips
                .into_iter()
                .map(|chip| ChipVm {
                    number: chip.index + 1,
                    token: chip.token,
                    used: chip.used,
                })
                .collect(),
            meaning: item.meaning().map(str::to_owned),
            translation: item.translation().map(str::to_owned),
            status,
            hints_remaining,
            notice: self.notice.clone(),
            can_prev: !session.is_complete() && index > 0,
            can_next: !session.is_complete() && !session.is_last(),
            can_finalize: !session.is_complete() && session.is_last(),
            is_complete: session.is_complete(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<SummaryVm> {
        SummaryVm::from_session(&self.session)
    }

    fn apply(&mut self, intent: QuizIntent) -> Result<QuizOutcome, SessionError> {
        match intent {
            QuizIntent::Type(text) => {
                self.session.set_input(AnswerInput::Text(text))?;
                Ok(QuizOutcome::Continue)
            }
            QuizIntent::FillBlank { index, text } => {
                self.session.fill_blank(index, text)?;
                Ok(QuizOutcome::Continue)
            }
            QuizIntent::PickChoice(index) => {
                self.session.pick_choice(index)?;
                Ok(QuizOutcome::Continue)
            }
            QuizIntent::UndoChoice => {
                self.session.undo_choice();
                Ok(QuizOutcome::Continue)
            }
            QuizIntent::Submit => {
                let input = self.session.input().clone();
                self.submit(input)
            }
            QuizIntent::Answer(line) => {
                let input = self.parse_line(&line)?;
                self.submit(input)
            }
            QuizIntent::Hint => {
                let hint = self.quiz_loop.hint(&self.member, &mut self.session)?;
                if hint.result.step.changed {
                    self.timer.cancel();
                }
                if let Some(write) = hint.persist {
                    self.track(write);
                }
                Ok(hint
                    .result
                    .outcome
                    .map_or(QuizOutcome::Continue, QuizOutcome::Answered))
            }
            QuizIntent::Next => {
                if self.session.next() {
                    self.timer.cancel();
                }
                Ok(QuizOutcome::Continue)
            }
            QuizIntent::Prev => {
                if self.session.prev() {
                    self.timer.cancel();
                }
                Ok(QuizOutcome::Continue)
            }
            QuizIntent::Finalize => {
                self.session.finalize()?;
                self.timer.cancel();
                Ok(QuizOutcome::Completed)
            }
            QuizIntent::RetryIncorrect => {
                let next = self.session.retry_incorrect()?;
                self.replace(next);
                Ok(QuizOutcome::Restarted)
            }
            QuizIntent::RestartAll => {
                let next = self.session.restart_all()?;
                self.replace(next);
                Ok(QuizOutcome::Restarted)
            }
        }
    }

    fn submit(&mut self, input: AnswerInput) -> Result<QuizOutcome, SessionError> {
        let submission = self
            .quiz_loop
            .submit(&self.member, &mut self.session, input)?;
        self.timer.cancel();
        if let (Some(ticket), Some(delay)) = (
            submission.result.reset,
            self.session.settings().auto_reset_delay(),
        ) {
            self.timer.schedule(ticket, delay);
        }
        self.track(submission.persist);
        Ok(QuizOutcome::Answered(submission.result.outcome))
    }

    /// Choice items take space-separated 1-based numbers; everything else is free text.
    fn parse_line(&self, line: &str) -> Result<AnswerInput, SessionError> {
        use quiz_core::matcher::InputError;

        match self.session.input() {
            AnswerInput::Choices(_) => line
                .split_whitespace()
                .map(|raw| match raw.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(n - 1),
                    _ => Err(SessionError::from(InputError::UnexpectedShape)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(AnswerInput::Choices),
            AnswerInput::Blanks(slots) if slots.len() > 1 => {
                let words: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
                if words.len() == slots.len() {
                    Ok(AnswerInput::Blanks(words))
                } else {
                    Ok(AnswerInput::Text(line.to_owned()))
                }
            }
            _ => Ok(AnswerInput::Text(line.to_owned())),
        }
    }

    fn track(&mut self, write: PersistHandle) {
        self.writes.retain(|pending| !pending.is_finished());
        self.writes.push(write);
    }

    fn replace(&mut self, session: QuizSession) {
        self.timer.cancel();
        self.session = session;
    }
}

/// Fetch items and start a quiz screen.
///
/// # Errors
///
/// Returns `ViewError::EmptySession` when the set has no items and
/// `ViewError::Unavailable` when it could not be loaded.
pub async fn start_quiz(
    ctx: &AppContext,
    request: ItemRequest,
    settings: QuizSettings,
) -> Result<(QuizVm, UnboundedReceiver<ResetTicket>), ViewError> {
    let session = ctx
        .quiz_loop()
        .start_session(ctx.member(), request, settings)
        .await
        .map_err(|err| ViewError::from(&err))?;
    Ok(QuizVm::new(ctx, session))
}
