use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::hint::{HintStep, next_hint, seed_freebie};
use quiz_core::ledger::ResultLedger;
use quiz_core::model::{
    AnswerInput, AnswerRecord, ExpectedAnswer, MemberId, Outcome, QuizItem, QuizSettings,
    QuizVariant, SessionId, SessionSummary,
};
use quiz_core::navigator::ItemNavigator;
use quiz_core::render::RenderedItem;

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── PHASES & RESULTS ──────────────────────────────────────────────────────────
//

/// Where the controller is for the current item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Item shown, nothing submitted during this presentation.
    Presenting,
    /// Item has an outcome from this presentation.
    Answered(Outcome),
    /// Final result shown; every position has an outcome.
    Completed,
}

/// Permission for a delayed reset after an incorrect answer.
///
/// Only honoured while the session is still on the same item and nothing
/// else has happened since the ticket was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTicket {
    position: usize,
    generation: u64,
}

impl ResetTicket {
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    pub position: usize,
    pub outcome: Outcome,
    /// Result to hand to the persistence collaborator.
    pub record: AnswerRecord,
    /// Present when the variant clears wrong answers after a delay.
    pub reset: Option<ResetTicket>,
    /// The controller moved on to the next item.
    pub advanced: bool,
}

/// Outcome of a hint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintResult {
    pub position: usize,
    pub step: HintStep,
    /// Set when the hint decided the item (completed it or spent the last hint
    /// under the strict policy).
    pub outcome: Option<Outcome>,
    pub record: Option<AnswerRecord>,
    pub advanced: bool,
}

/// Comparable copy of the mutable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub index: usize,
    pub phase: SessionPhase,
    pub outcomes: Vec<Outcome>,
    pub hint_counts: Vec<u32>,
    pub locked: Vec<usize>,
    pub input: AnswerInput,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session for one quiz screen.
///
/// Steps through its items, validates answers through the variant's matcher,
/// dispenses hints, and records outcomes. Purely synchronous: persistence and
/// timers live in `QuizLoopService` and `AutoResetTimer`.
pub struct QuizSession {
    id: SessionId,
    member_id: MemberId,
    variant: QuizVariant,
    settings: QuizSettings,
    original: Arc<[QuizItem]>,
    items: Vec<QuizItem>,
    navigator: ItemNavigator,
    ledger: ResultLedger,
    hint_counts: Vec<u32>,
    locked: BTreeSet<usize>,
    input: AnswerInput,
    phase: SessionPhase,
    generation: u64,
    attempt: u32,
    clock: Clock,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    rng: StdRng,
}

impl QuizSession {
    /// Start a session over `items`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no items are provided and
    /// `SessionError::ItemShape` if an item does not fit the variant.
    pub fn new(
        member_id: MemberId,
        variant: QuizVariant,
        settings: QuizSettings,
        items: Vec<QuizItem>,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let rng = StdRng::from_rng(&mut rand::rng());
        Self::new_with_rng(member_id, variant, settings, items, clock, rng)
    }

    /// Like [`QuizSession::new`] with a deterministic random source.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::new`].
    pub fn new_seeded(
        member_id: MemberId,
        variant: QuizVariant,
        settings: QuizSettings,
        items: Vec<QuizItem>,
        clock: Clock,
        seed: u64,
    ) -> Result<Self, SessionError> {
        Self::new_with_rng(
            member_id,
            variant,
            settings,
            items,
            clock,
            StdRng::seed_from_u64(seed),
        )
    }

    fn new_with_rng(
        member_id: MemberId,
        variant: QuizVariant,
        settings: QuizSettings,
        items: Vec<QuizItem>,
        clock: Clock,
        mut rng: StdRng,
    ) -> Result<Self, SessionError> {
        for item in &items {
            check_shape(item, variant)?;
        }
        let original: Arc<[QuizItem]> = items.clone().into();
        let mut working = items;
        if settings.shuffle_items() {
            working.shuffle(&mut rng);
        }
        Self::start(member_id, variant, settings, original, working, 1, clock, rng)
    }

    #[allow(clippy::too_many_arguments)]
    fn start(
        member_id: MemberId,
        variant: QuizVariant,
        settings: QuizSettings,
        original: Arc<[QuizItem]>,
        items: Vec<QuizItem>,
        attempt: u32,
        clock: Clock,
        rng: StdRng,
    ) -> Result<Self, SessionError> {
        let len = NonZeroUsize::new(items.len()).ok_or(SessionError::Empty)?;
        let input = AnswerInput::empty_for(&items[0]);

        let mut session = Self {
            id: SessionId::random(),
            member_id,
            variant,
            settings,
            original,
            navigator: ItemNavigator::new(len),
            ledger: ResultLedger::new(len.get()),
            hint_counts: vec![0; len.get()],
            locked: BTreeSet::new(),
            input,
            phase: SessionPhase::Presenting,
            generation: 0,
            attempt,
            started_at: clock.now(),
            clock,
            completed_at: None,
            items,
            rng,
        };
        session.present();
        debug!(
            session = %session.id,
            variant = %variant,
            items = len.get(),
            attempt,
            "quiz session started"
        );
        Ok(session)
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    #[must_use]
    pub fn variant(&self) -> QuizVariant {
        self.variant
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    /// The item set the first attempt started from.
    #[must_use]
    pub fn original_items(&self) -> &[QuizItem] {
        &self.original
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.navigator.index()
    }

    #[must_use]
    pub fn current_item(&self) -> &QuizItem {
        &self.items[self.navigator.index()]
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.navigator.is_last()
    }

    #[must_use]
    pub fn ledger(&self) -> &ResultLedger {
        &self.ledger
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn input(&self) -> &AnswerInput {
        &self.input
    }

    #[must_use]
    pub fn hint_count(&self, position: usize) -> u32 {
        self.hint_counts.get(position).copied().unwrap_or(0)
    }

    /// Hints left for the current item.
    #[must_use]
    pub fn hints_remaining(&self) -> u32 {
        self.settings
            .max_hints()
            .saturating_sub(self.hint_count(self.current_index()))
    }

    #[must_use]
    pub fn is_locked(&self, position: usize) -> bool {
        self.locked.contains(&position)
    }

    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, SessionPhase::Completed)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.items.len();
        let answered = self.ledger.answered_count();
        SessionProgress {
            total,
            position: self.current_index() + 1,
            answered,
            correct: self.ledger.score(),
            remaining: total - answered,
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            index: self.current_index(),
            phase: self.phase,
            outcomes: self.ledger.outcomes().to_vec(),
            hint_counts: self.hint_counts.clone(),
            locked: self.locked.iter().copied().collect(),
            input: self.input.clone(),
        }
    }

    /// Current item rendered with the input buffer.
    #[must_use]
    pub fn render(&self) -> RenderedItem {
        self.variant
            .renderer()
            .render(self.current_item(), &self.input)
    }

    // ─── Input buffer ────────────────────────────────────────────────────────

    /// Replace the input buffer for the current item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` after finalize,
    /// `SessionError::ItemLocked` for a locked item, and
    /// `SessionError::InvalidInput` when the buffer does not fit the item.
    pub fn set_input(&mut self, input: AnswerInput) -> Result<(), SessionError> {
        self.ensure_open()?;
        input.fits(self.current_item())?;
        self.input = input;
        Ok(())
    }

    /// Write `text` into blank `index` of a phrase item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidInput` when the item has no such blank.
    pub fn fill_blank(&mut self, index: usize, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        match &mut self.input {
            AnswerInput::Blanks(blanks) if index < blanks.len() => {
                blanks[index] = text.into();
                Ok(())
            }
            AnswerInput::Text(current) if index == 0 => {
                *current = text.into();
                Ok(())
            }
            _ => Err(quiz_core::matcher::InputError::UnexpectedShape.into()),
        }
    }

    /// Append choice `index` to the picked sequence.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidInput` for an unknown or already picked choice.
    pub fn pick_choice(&mut self, index: usize) -> Result<(), SessionError> {
        use quiz_core::matcher::InputError;

        self.ensure_open()?;
        let available = self.current_item().choices().len();
        let AnswerInput::Choices(picked) = &mut self.input else {
            return Err(InputError::UnexpectedShape.into());
        };
        if index >= available {
            return Err(InputError::UnknownChoice { index }.into());
        }
        if picked.contains(&index) {
            return Err(InputError::DuplicateChoice { index }.into());
        }
        picked.push(index);
        Ok(())
    }

    /// Remove the most recently picked choice. Returns it, if any.
    pub fn undo_choice(&mut self) -> Option<usize> {
        if self.ensure_open().is_err() {
            return None;
        }
        match &mut self.input {
            AnswerInput::Choices(picked) => picked.pop(),
            _ => None,
        }
    }

    // ─── Transitions ─────────────────────────────────────────────────────────

    /// Evaluate `input` against the current item and record the outcome.
    ///
    /// Invalid input is rejected without touching the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed`, `ItemLocked`, `AlreadyAnswered`, or
    /// `InvalidInput`.
    pub fn submit(&mut self, input: AnswerInput) -> Result<SubmitResult, SessionError> {
        self.ensure_open()?;
        let position = self.current_index();
        if self.ledger.outcome(position) == Some(Outcome::Correct) {
            return Err(SessionError::AlreadyAnswered);
        }

        let correct = self
            .variant
            .matcher()
            .check(self.current_item(), &input)?;

        self.input = input;
        let outcome = Outcome::from_correct(correct);
        let record = self.settle(position, outcome)?;

        let reset = match (outcome, self.settings.auto_reset_delay()) {
            (Outcome::Incorrect, Some(_)) => Some(ResetTicket {
                position,
                generation: self.generation,
            }),
            _ => None,
        };
        let advanced = self.advance_after(outcome);

        debug!(
            session = %self.id,
            position,
            item = %record.item_id,
            correct,
            "answer submitted"
        );
        Ok(SubmitResult {
            position,
            outcome,
            record,
            reset,
            advanced,
        })
    }

    /// Submit whatever is in the input buffer.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::submit`].
    pub fn submit_current(&mut self) -> Result<SubmitResult, SessionError> {
        let input = self.input.clone();
        self.submit(input)
    }

    /// Reveal one more character of the current item's answer.
    ///
    /// For phrase items the first blank that does not match yet is hinted.
    /// A request with no budget left, or on an already correct buffer, is a no-op
    /// (`step.changed == false`).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::HintUnavailable` for choice items or when the
    /// variant has no hint budget, plus the same state errors as `submit`.
    pub fn hint(&mut self) -> Result<HintResult, SessionError> {
        self.ensure_open()?;
        if !self.settings.hints_enabled() || self.current_item().is_choice_based() {
            return Err(SessionError::HintUnavailable);
        }
        let position = self.current_index();
        if self.ledger.outcome(position) == Some(Outcome::Correct) {
            return Err(SessionError::AlreadyAnswered);
        }

        let (blank, current, answer) = self.hint_target()?;
        let step = next_hint(
            &current,
            &answer,
            self.hint_counts[position],
            self.settings.max_hints(),
            self.settings.hint_policy(),
        );
        if !step.changed {
            return Ok(HintResult {
                position,
                step,
                outcome: None,
                record: None,
                advanced: false,
            });
        }

        match (&mut self.input, blank) {
            (AnswerInput::Blanks(blanks), Some(at)) => blanks[at].clone_from(&step.revealed),
            (buffer, _) => *buffer = AnswerInput::Text(step.revealed.clone()),
        }
        self.hint_counts[position] = step.hints_used;

        let outcome = if step.forced_incorrect {
            self.locked.insert(position);
            Some(Outcome::Incorrect)
        } else if self
            .variant
            .matcher()
            .check(self.current_item(), &self.input)
            .unwrap_or(false)
        {
            Some(Outcome::Correct)
        } else {
            None
        };

        let (record, advanced) = match outcome {
            Some(outcome) => {
                let record = self.settle(position, outcome)?;
                (Some(record), self.advance_after(outcome))
            }
            None => {
                // A hint while a wrong answer is on screen supersedes its pending reset.
                if matches!(self.phase, SessionPhase::Answered(_)) {
                    self.phase = SessionPhase::Presenting;
                    self.generation += 1;
                }
                (None, false)
            }
        };

        debug!(
            session = %self.id,
            position,
            hints_used = step.hints_used,
            forced_incorrect = step.forced_incorrect,
            "hint dispensed"
        );
        Ok(HintResult {
            position,
            step,
            outcome,
            record,
            advanced,
        })
    }

    /// Move to the next item. No-op (returns false) on the last item or after finalize.
    pub fn next(&mut self) -> bool {
        if self.is_complete() || !self.navigator.next() {
            return false;
        }
        self.present();
        true
    }

    /// Move to the previous item. No-op (returns false) on the first item or after finalize.
    pub fn prev(&mut self) -> bool {
        if self.is_complete() || !self.navigator.prev() {
            return false;
        }
        self.present();
        true
    }

    /// Clear a wrong answer once its reset delay has elapsed.
    ///
    /// Returns false for a stale ticket (the learner navigated, answered again,
    /// or the session finished since it was issued).
    pub fn apply_auto_reset(&mut self, ticket: ResetTicket) -> bool {
        let current = ticket.generation == self.generation
            && ticket.position == self.current_index()
            && self.phase == SessionPhase::Answered(Outcome::Incorrect);
        if !current {
            return false;
        }
        self.input = AnswerInput::empty_for(self.current_item());
        self.phase = SessionPhase::Presenting;
        self.generation += 1;
        true
    }

    /// Show the final result: every unanswered item counts as incorrect.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAtLastItem` unless the last item is current,
    /// `SessionError::Completed` if already finalized.
    pub fn finalize(&mut self) -> Result<SessionSummary, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if !self.navigator.is_last() {
            return Err(SessionError::NotAtLastItem);
        }

        let skipped = self.ledger.force_complete_unanswered();
        self.phase = SessionPhase::Completed;
        self.generation += 1;
        self.completed_at = Some(self.clock.now());

        let summary = self.summary()?;
        info!(
            session = %self.id,
            score = summary.score(),
            total = summary.total(),
            skipped,
            attempt = self.attempt,
            "quiz session completed"
        );
        Ok(summary)
    }

    /// Summary of a finalized session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` before `finalize`.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let completed_at = self.completed_at.ok_or(SessionError::NotCompleted)?;
        Ok(SessionSummary::from_ledger(
            self.id,
            self.member_id,
            self.variant,
            self.attempt,
            self.started_at,
            completed_at,
            &self.ledger,
        )?)
    }

    /// A fresh session over only the items that ended incorrect, in their current order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` before `finalize` and
    /// `SessionError::NothingToRetry` when every item was correct.
    pub fn retry_incorrect(&mut self) -> Result<QuizSession, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::NotCompleted);
        }
        let items: Vec<QuizItem> = self
            .ledger
            .incorrect_positions()
            .into_iter()
            .map(|p| self.items[p].clone())
            .collect();
        if items.is_empty() {
            return Err(SessionError::NothingToRetry);
        }
        let rng = StdRng::from_rng(&mut self.rng);
        Self::start(
            self.member_id,
            self.variant,
            self.settings.clone(),
            Arc::clone(&self.original),
            items,
            self.attempt + 1,
            self.clock,
            rng,
        )
    }

    /// A fresh session over the original item set.
    ///
    /// # Errors
    ///
    /// Only fails if the original set were empty, which `new` already rules out.
    pub fn restart_all(&mut self) -> Result<QuizSession, SessionError> {
        let mut rng = StdRng::from_rng(&mut self.rng);
        let mut items = self.original.to_vec();
        if self.settings.shuffle_items() {
            items.shuffle(&mut rng);
        }
        Self::start(
            self.member_id,
            self.variant,
            self.settings.clone(),
            Arc::clone(&self.original),
            items,
            1,
            self.clock,
            rng,
        )
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let position = self.current_index();
        if self.locked.contains(&position) {
            return Err(SessionError::ItemLocked { position });
        }
        Ok(())
    }

    /// Reset the per-presentation state for the item under the cursor.
    ///
    /// An item that already has an outcome comes back as `Answered`.
    fn present(&mut self) {
        let position = self.current_index();
        let item = &self.items[position];
        let recorded = self
            .ledger
            .outcome(position)
            .filter(|outcome| outcome.is_answered());
        self.input = match item.expected() {
            ExpectedAnswer::Text(answer)
                if recorded.is_none()
                    && self.settings.seed_freebie()
                    && !item.is_choice_based() =>
            {
                AnswerInput::Text(seed_freebie(answer, &mut self.rng))
            }
            _ => AnswerInput::empty_for(item),
        };
        self.hint_counts[position] = 0;
        self.phase = recorded.map_or(SessionPhase::Presenting, SessionPhase::Answered);
        self.generation += 1;
    }

    fn settle(&mut self, position: usize, outcome: Outcome) -> Result<AnswerRecord, SessionError> {
        self.ledger.record(position, outcome)?;
        self.phase = SessionPhase::Answered(outcome);
        self.generation += 1;
        Ok(AnswerRecord::new(self.items[position].id(), outcome))
    }

    fn advance_after(&mut self, outcome: Outcome) -> bool {
        outcome == Outcome::Correct && self.settings.advance_on_correct() && self.next()
    }

    /// Blank index (phrase items), current text, and expected text to hint against.
    fn hint_target(&self) -> Result<(Option<usize>, String, String), SessionError> {
        let expected = self.current_item().expected();
        match &self.input {
            AnswerInput::Text(current) => Ok((None, current.clone(), expected.joined())),
            AnswerInput::Blanks(blanks) => {
                let at = (0..blanks.len())
                    .find(|&i| expected.blank(i) != Some(blanks[i].as_str()))
                    .unwrap_or(0);
                let (Some(current), Some(want)) = (blanks.get(at), expected.blank(at)) else {
                    return Err(SessionError::HintUnavailable);
                };
                Ok((Some(at), current.clone(), want.to_owned()))
            }
            AnswerInput::Choices(_) => Err(SessionError::HintUnavailable),
        }
    }
}

fn check_shape(item: &QuizItem, variant: QuizVariant) -> Result<(), SessionError> {
    let fits = match variant {
        QuizVariant::Grammar => item.is_choice_based(),
        QuizVariant::Word | QuizVariant::Expression => !item.is_choice_based(),
    };
    if fits {
        Ok(())
    } else {
        Err(SessionError::ItemShape {
            item_id: item.id(),
            variant,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("items_len", &self.items.len())
            .field("current", &self.current_index())
            .field("phase", &self.phase)
            .field("attempt", &self.attempt)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::matcher::InputError;
    use quiz_core::model::{HintPolicy, ItemId};
    use quiz_core::time::fixed_clock;

    fn word(id: u64, answer: &str) -> QuizItem {
        QuizItem::blank(ItemId::new(id), "", answer).unwrap()
    }

    fn plain_settings() -> QuizSettings {
        QuizSettings::new(3, HintPolicy::AllowRecovery, None, false, false, false).unwrap()
    }

    fn strict_settings() -> QuizSettings {
        QuizSettings::new(3, HintPolicy::ForceIncorrect, Some(1_500), false, false, false)
            .unwrap()
    }

    fn session(settings: QuizSettings, answers: &[&str]) -> QuizSession {
        let items = answers
            .iter()
            .enumerate()
            .map(|(i, a)| word(i as u64 + 1, a))
            .collect();
        QuizSession::new_seeded(
            MemberId::new(1),
            QuizVariant::Word,
            settings,
            items,
            fixed_clock(),
            42,
        )
        .unwrap()
    }

    fn text(s: &str) -> AnswerInput {
        AnswerInput::Text(s.to_string())
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::new(
            MemberId::new(1),
            QuizVariant::Word,
            plain_settings(),
            Vec::new(),
            fixed_clock(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn grammar_session_rejects_plain_items() {
        let err = QuizSession::new(
            MemberId::new(1),
            QuizVariant::Grammar,
            QuizSettings::for_variant(QuizVariant::Grammar),
            vec![word(7, "cat")],
            fixed_clock(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::ItemShape { item_id, .. } if item_id == ItemId::new(7)
        ));
    }

    #[test]
    fn scenario_answer_skip_and_finalize() {
        let mut s = session(plain_settings(), &["one", "two", "three"]);

        let first = s.submit(text("one")).unwrap();
        assert_eq!(first.outcome, Outcome::Correct);
        assert!(first.record.correct);
        assert!(s.next());

        let second = s.submit(text("twin")).unwrap();
        assert_eq!(second.outcome, Outcome::Incorrect);
        assert_eq!(second.record.item_id, ItemId::new(2));
        assert!(s.next());
        assert!(!s.ledger().is_complete());

        let summary = s.finalize().unwrap();
        assert!(s.ledger().is_complete());
        assert_eq!(
            s.ledger().outcomes(),
            &[Outcome::Correct, Outcome::Incorrect, Outcome::Incorrect]
        );
        assert_eq!(s.ledger().score(), 1);
        assert_eq!(summary.score(), 1);
        assert_eq!(summary.incorrect_positions(), &[1, 2]);
        assert_eq!(s.phase(), SessionPhase::Completed);
    }

    #[test]
    fn retry_incorrect_keeps_only_wrong_items() {
        let mut s = session(plain_settings(), &["one", "two", "three"]);
        s.submit(text("one")).unwrap();
        s.next();
        s.submit(text("nope")).unwrap();
        s.next();
        s.finalize().unwrap();

        let retry = s.retry_incorrect().unwrap();
        let ids: Vec<ItemId> = retry.items().iter().map(QuizItem::id).collect();
        assert_eq!(ids, vec![ItemId::new(2), ItemId::new(3)]);
        assert_eq!(retry.current_index(), 0);
        assert_eq!(retry.attempt(), 2);
        assert!(!retry.ledger().is_complete());
        assert_eq!(retry.original_items().len(), 3);
        assert_ne!(retry.id(), s.id());
    }

    #[test]
    fn retry_requires_completion_and_mistakes() {
        let mut s = session(plain_settings(), &["solo"]);
        assert!(matches!(
            s.retry_incorrect().unwrap_err(),
            SessionError::NotCompleted
        ));
        s.submit(text("solo")).unwrap();
        s.finalize().unwrap();
        assert!(matches!(
            s.retry_incorrect().unwrap_err(),
            SessionError::NothingToRetry
        ));
    }

    #[test]
    fn restart_all_uses_original_items() {
        let mut s = session(plain_settings(), &["a", "b"]);
        s.submit(text("x")).unwrap();
        s.next();
        s.finalize().unwrap();
        let mut retry = s.retry_incorrect().unwrap();
        assert_eq!(retry.items().len(), 2);

        retry.submit(text("a")).unwrap();
        let restarted = retry.restart_all().unwrap();
        assert_eq!(restarted.items().len(), 2);
        assert_eq!(restarted.attempt(), 1);
        assert_eq!(restarted.ledger().answered_count(), 0);
        assert_eq!(restarted.current_index(), 0);
    }

    #[test]
    fn navigation_at_bounds_leaves_state_unchanged() {
        let mut s = session(plain_settings(), &["a", "b"]);
        s.set_input(text("typing")).unwrap();
        let before = s.snapshot();
        assert!(!s.prev());
        assert_eq!(s.snapshot(), before);

        assert!(s.next());
        let before = s.snapshot();
        assert!(!s.next());
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn navigation_clears_input() {
        let mut s = session(plain_settings(), &["a", "b"]);
        s.set_input(text("half")).unwrap();
        assert!(s.next());
        assert_eq!(s.input(), &text(""));
        assert_eq!(s.phase(), SessionPhase::Presenting);
    }

    #[test]
    fn invalid_input_does_not_mutate() {
        let mut s = session(plain_settings(), &["a"]);
        let before = s.snapshot();
        let err = s.submit(text("   ")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(InputError::Incomplete)));
        let err = s.submit(AnswerInput::Choices(vec![0])).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidInput(InputError::UnexpectedShape)
        ));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn revisited_correct_item_stays_answered() {
        let mut s = session(plain_settings(), &["apple", "pear"]);
        s.submit(text("apple")).unwrap();
        assert!(s.next());
        assert!(s.prev());
        assert_eq!(s.phase(), SessionPhase::Answered(Outcome::Correct));

        let err = s.submit(text("wrong")).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyAnswered));
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Correct));
    }

    #[test]
    fn revisited_correct_item_refuses_hints() {
        let mut s = session(strict_settings(), &["apple", "pear"]);
        s.submit(text("apple")).unwrap();
        assert!(s.next());
        assert!(s.prev());
        for _ in 0..3 {
            assert!(matches!(
                s.hint().unwrap_err(),
                SessionError::AlreadyAnswered
            ));
        }
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Correct));
        assert!(!s.is_locked(0));
    }

    #[test]
    fn revisited_incorrect_item_can_be_corrected() {
        let mut s = session(strict_settings(), &["apple", "pear"]);
        s.submit(text("apply")).unwrap();
        assert!(s.next());
        assert!(s.prev());
        assert_eq!(s.phase(), SessionPhase::Answered(Outcome::Incorrect));

        let result = s.submit(text("apple")).unwrap();
        assert_eq!(result.outcome, Outcome::Correct);
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Correct));
    }

    #[test]
    fn misshaped_buffer_is_rejected() {
        let phrase = QuizItem::phrase(
            ItemId::new(1),
            "___ ___",
            vec!["give".into(), "up".into()],
        )
        .unwrap();
        let mut s = QuizSession::new_seeded(
            MemberId::new(1),
            QuizVariant::Expression,
            plain_settings(),
            vec![phrase],
            fixed_clock(),
            3,
        )
        .unwrap();
        let before = s.snapshot();

        let err = s.set_input(AnswerInput::Blanks(Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidInput(InputError::BlankCount {
                expected: 2,
                provided: 0
            })
        ));
        let err = s.set_input(AnswerInput::Choices(vec![0])).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidInput(InputError::UnexpectedShape)
        ));
        assert_eq!(s.snapshot(), before);

        let result = s.hint().unwrap();
        assert!(result.step.changed);
        assert_eq!(
            s.input(),
            &AnswerInput::Blanks(vec!["g   ".into(), String::new()])
        );
    }

    #[test]
    fn corrected_answer_overwrites_incorrect() {
        let mut s = session(plain_settings(), &["apple"]);
        s.submit(text("aple")).unwrap();
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Incorrect));
        let again = s.submit(text("Apple")).unwrap();
        assert_eq!(again.outcome, Outcome::Incorrect);
        s.submit(text("apple.")).unwrap();
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Correct));
        assert!(matches!(
            s.submit(text("apple")).unwrap_err(),
            SessionError::AlreadyAnswered
        ));
    }

    #[test]
    fn strict_policy_forces_incorrect_on_last_hint() {
        let mut s = QuizSession::new_seeded(
            MemberId::new(1),
            QuizVariant::Expression,
            strict_settings(),
            vec![word(1, "apple")],
            fixed_clock(),
            1,
        )
        .unwrap();

        let h1 = s.hint().unwrap();
        let h2 = s.hint().unwrap();
        assert_eq!(h1.outcome, None);
        assert_eq!(h2.outcome, None);
        let h3 = s.hint().unwrap();
        assert_eq!(h3.outcome, Some(Outcome::Incorrect));
        assert_eq!(h3.record, Some(AnswerRecord::new(ItemId::new(1), Outcome::Incorrect)));
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Incorrect));
        assert!(s.is_locked(0));

        let err = s.submit(text("apple")).unwrap_err();
        assert!(matches!(err, SessionError::ItemLocked { position: 0 }));
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Incorrect));
    }

    #[test]
    fn lenient_policy_allows_recovery_after_budget() {
        let mut s = session(plain_settings(), &["apple"]);
        for _ in 0..3 {
            s.hint().unwrap();
        }
        let spent = s.hint().unwrap();
        assert!(!spent.step.changed);
        assert_eq!(s.hints_remaining(), 0);
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Unanswered));

        let result = s.submit(text("apple")).unwrap();
        assert_eq!(result.outcome, Outcome::Correct);
    }

    #[test]
    fn hint_that_completes_answer_counts_correct() {
        let mut s = session(plain_settings(), &["ox"]);
        s.set_input(text("o")).unwrap();
        let result = s.hint().unwrap();
        assert_eq!(result.step.revealed, "ox");
        assert_eq!(result.outcome, Some(Outcome::Correct));
        assert!(result.record.unwrap().correct);
        assert_eq!(s.ledger().score(), 1);
    }

    #[test]
    fn hint_counts_grow_then_reset_on_re_presentation() {
        let mut s = session(plain_settings(), &["apple", "pear"]);
        let mut seen = Vec::new();
        for _ in 0..2 {
            s.hint().unwrap();
            seen.push(s.hint_count(0));
        }
        assert_eq!(seen, vec![1, 2]);

        assert!(s.next());
        assert!(s.prev());
        assert_eq!(s.hint_count(0), 0);
        assert_eq!(s.hints_remaining(), 3);
    }

    #[test]
    fn phrase_hint_targets_first_wrong_blank() {
        let item = QuizItem::phrase(
            ItemId::new(1),
            "___ ___",
            vec!["give".into(), "up".into()],
        )
        .unwrap();
        let mut s = QuizSession::new_seeded(
            MemberId::new(1),
            QuizVariant::Expression,
            plain_settings(),
            vec![item],
            fixed_clock(),
            3,
        )
        .unwrap();
        s.fill_blank(0, "give").unwrap();
        let result = s.hint().unwrap();
        assert_eq!(
            s.input(),
            &AnswerInput::Blanks(vec!["give".into(), "u ".into()])
        );
        assert_eq!(result.outcome, None);
    }

    #[test]
    fn word_freebie_prefills_one_letter() {
        let settings =
            QuizSettings::new(3, HintPolicy::AllowRecovery, None, true, false, false).unwrap();
        let s = session(settings, &["banana"]);
        let AnswerInput::Text(buffer) = s.input() else {
            panic!("word quiz should use a text buffer");
        };
        assert_eq!(buffer.chars().count(), 6);
        assert_eq!(buffer.chars().filter(|c| *c != ' ').count(), 1);
        assert_eq!(s.hint_count(0), 0);
    }

    #[test]
    fn advance_on_correct_moves_forward() {
        let settings = QuizSettings::for_variant(QuizVariant::Word);
        let mut s = session(settings, &["a", "b"]);
        let result = s.submit(text("a")).unwrap();
        assert!(result.advanced);
        assert_eq!(s.current_index(), 1);

        let last = s.submit(text("b")).unwrap();
        assert!(!last.advanced);
        assert_eq!(s.phase(), SessionPhase::Answered(Outcome::Correct));
    }

    #[test]
    fn reset_ticket_clears_wrong_answer() {
        let mut s = session(strict_settings(), &["apple", "pear"]);
        let result = s.submit(text("apply")).unwrap();
        let ticket = result.reset.expect("strict settings reset wrong answers");
        assert!(s.apply_auto_reset(ticket));
        assert_eq!(s.phase(), SessionPhase::Presenting);
        assert_eq!(s.input(), &text(""));
        assert_eq!(s.ledger().outcome(0), Some(Outcome::Incorrect));
        assert!(!s.apply_auto_reset(ticket));
    }

    #[test]
    fn navigation_invalidates_reset_ticket() {
        let mut s = session(strict_settings(), &["apple", "pear"]);
        let ticket = s.submit(text("apply")).unwrap().reset.unwrap();
        assert!(s.next());
        assert!(s.prev());
        let before = s.snapshot();
        assert!(!s.apply_auto_reset(ticket));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn finalize_only_from_last_item() {
        let mut s = session(plain_settings(), &["a", "b"]);
        assert!(matches!(
            s.finalize().unwrap_err(),
            SessionError::NotAtLastItem
        ));
        s.next();
        s.finalize().unwrap();
        assert!(matches!(s.finalize().unwrap_err(), SessionError::Completed));
        assert!(matches!(
            s.submit(text("b")).unwrap_err(),
            SessionError::Completed
        ));
        assert!(!s.prev());
        assert_eq!(s.summary().unwrap().total(), 2);
    }

    #[test]
    fn choice_items_are_built_from_picks() {
        let item = QuizItem::sentence(
            ItemId::new(1),
            "Arrange",
            vec!["I".into(), "am".into(), "fine".into()],
            vec!["fine".into(), "I".into(), "am".into()],
        )
        .unwrap();
        let mut s = QuizSession::new_seeded(
            MemberId::new(1),
            QuizVariant::Grammar,
            QuizSettings::for_variant(QuizVariant::Grammar),
            vec![item],
            fixed_clock(),
            9,
        )
        .unwrap();

        assert!(matches!(s.hint().unwrap_err(), SessionError::HintUnavailable));
        s.pick_choice(1).unwrap();
        s.pick_choice(2).unwrap();
        assert!(matches!(
            s.submit_current().unwrap_err(),
            SessionError::InvalidInput(InputError::Incomplete)
        ));
        s.pick_choice(0).unwrap();
        assert!(matches!(
            s.pick_choice(0).unwrap_err(),
            SessionError::InvalidInput(InputError::DuplicateChoice { index: 0 })
        ));
        assert_eq!(s.render().to_plain_text(), "Arrange [I] [am] [fine]");

        let result = s.submit_current().unwrap();
        assert_eq!(result.outcome, Outcome::Correct);
        assert_eq!(result.record.item_id, ItemId::new(1));
    }

    #[test]
    fn progress_tracks_answers() {
        let mut s = session(plain_settings(), &["a", "b", "c"]);
        s.submit(text("a")).unwrap();
        s.next();
        let progress = s.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.position, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.correct, 1);
        assert_eq!(progress.remaining, 2);
        assert!(!progress.is_complete);
    }

    #[test]
    fn shuffled_session_keeps_every_item() {
        let settings = plain_settings().with_shuffle_items(true);
        let s = session(settings, &["a", "b", "c", "d", "e"]);
        let mut ids: Vec<u64> = s.items().iter().map(|i| i.id().value()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(s.original_items()[0].id(), ItemId::new(1));
    }
}
