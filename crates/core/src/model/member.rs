use crate::model::ids::MemberId;

/// The logged-in member a session runs on behalf of.
///
/// Handed explicitly to every service call that needs it; nothing in the
/// workspace keeps a process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    display_name: String,
}

impl Member {
    #[must_use]
    pub fn new(id: MemberId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Member used when no login is available (local practice).
    #[must_use]
    pub fn guest() -> Self {
        Self::new(MemberId::new(0), "guest")
    }

    #[must_use]
    pub fn id(&self) -> MemberId {
        self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.id.value() == 0
    }
}
