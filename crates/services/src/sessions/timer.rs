use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

use super::controller::ResetTicket;

/// Delivers a [`ResetTicket`] after the configured delay.
///
/// At most one reset is pending: scheduling again, cancelling, or dropping the
/// timer aborts the previous one. Delivered tickets still go through
/// `QuizSession::apply_auto_reset`, which ignores stale ones.
#[derive(Debug)]
pub struct AutoResetTimer {
    tx: mpsc::UnboundedSender<ResetTicket>,
    pending: Option<JoinHandle<()>>,
}

impl AutoResetTimer {
    /// New timer and the receiver its tickets arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ResetTicket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, pending: None }, rx)
    }

    /// Deliver `ticket` after `delay`, replacing any pending reset.
    ///
    /// Outside a Tokio runtime nothing is scheduled and this returns false.
    pub fn schedule(&mut self, ticket: ResetTicket, delay: Duration) -> bool {
        self.cancel();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(position = ticket.position(), "no runtime available, auto reset skipped");
            return false;
        };
        let tx = self.tx.clone();
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the screen closed.
            let _ = tx.send(ticket);
        }));
        trace!(position = ticket.position(), ?delay, "auto reset scheduled");
        true
    }

    /// Abort the pending reset. Returns whether one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutoResetTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::QuizSession;
    use quiz_core::model::{AnswerInput, ItemId, MemberId, QuizItem, QuizSettings, QuizVariant};
    use quiz_core::time::fixed_clock;

    fn ticket() -> (QuizSession, ResetTicket) {
        let items = vec![
            QuizItem::blank(ItemId::new(1), "", "apple").unwrap(),
            QuizItem::blank(ItemId::new(2), "", "pear").unwrap(),
        ];
        let mut session = QuizSession::new_seeded(
            MemberId::new(1),
            QuizVariant::Expression,
            QuizSettings::for_variant(QuizVariant::Expression),
            items,
            fixed_clock(),
            5,
        )
        .unwrap();
        let result = session.submit(AnswerInput::Text("apply".into())).unwrap();
        let ticket = result.reset.unwrap();
        (session, ticket)
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_ticket_after_delay() {
        let (mut session, ticket) = ticket();
        let (mut timer, mut rx) = AutoResetTimer::channel();
        assert!(timer.schedule(ticket, Duration::from_millis(1_500)));
        assert!(timer.is_pending());

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(rx.try_recv().is_err());

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered, ticket);
        assert!(session.apply_auto_reset(delivered));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_delivery() {
        let (_session, ticket) = ticket();
        let (mut timer, mut rx) = AutoResetTimer::channel();
        timer.schedule(ticket, Duration::from_millis(1_500));
        assert!(timer.cancel());
        assert!(!timer.is_pending());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_ticket_after_navigation_is_ignored() {
        let (mut session, ticket) = ticket();
        let (mut timer, mut rx) = AutoResetTimer::channel();
        timer.schedule(ticket, Duration::from_millis(1_500));

        assert!(session.next());
        let before = session.snapshot();
        let delivered = rx.recv().await.unwrap();
        assert!(!session.apply_auto_reset(delivered));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn schedule_outside_runtime_is_skipped() {
        let (_session, ticket) = ticket();
        let (mut timer, mut rx) = AutoResetTimer::channel();
        assert!(!timer.schedule(ticket, Duration::from_millis(1_500)));
        assert!(!timer.is_pending());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_timer_aborts_pending_reset() {
        let (_session, ticket) = ticket();
        let (mut timer, mut rx) = AutoResetTimer::channel();
        timer.schedule(ticket, Duration::from_millis(200));
        drop(timer);

        // Sender side is gone once the task is aborted and the timer dropped.
        assert!(rx.recv().await.is_none());
    }
}
