/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    /// 1-based position of the current item.
    pub position: usize,
    pub answered: usize,
    pub correct: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Header text such as `3 / 10`.
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.position, self.total)
    }
}
