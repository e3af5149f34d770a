use std::sync::Arc;

use quiz_core::model::Member;
use services::QuizLoopService;

pub trait UiApp: Send + Sync {
    fn member(&self) -> Member;
    fn quiz_loop(&self) -> Arc<QuizLoopService>;
}

/// Services and the logged-in member, handed to every view model explicitly.
#[derive(Clone)]
pub struct AppContext {
    member: Member,
    quiz_loop: Arc<QuizLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            member: app.member(),
            quiz_loop: app.quiz_loop(),
        }
    }

    #[must_use]
    pub fn member(&self) -> &Member {
        &self.member
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
