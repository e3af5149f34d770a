//! Hint dispenser: reveals one character of the answer per request under a
//! capped budget.

use rand::Rng;

use crate::model::HintPolicy;

/// Character used for positions the learner has not filled yet.
pub const PLACEHOLDER: char = ' ';

/// Result of one hint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintStep {
    /// Buffer after the reveal (unchanged when the request was a no-op).
    pub revealed: String,
    /// Hints spent on the item after this request.
    pub hints_used: u32,
    /// The policy demands the item be recorded as incorrect.
    pub forced_incorrect: bool,
    /// False when the request was ignored (budget spent or already solved).
    pub changed: bool,
}

impl HintStep {
    /// True when the reveal completed the answer.
    #[must_use]
    pub fn completes(&self, answer: &str) -> bool {
        self.changed && self.revealed == answer
    }
}

/// Reveals the first character where `current` diverges from `answer`.
///
/// `current` is padded with [`PLACEHOLDER`] when shorter than the answer and
/// truncated when every answer position already matches. Once `hints_used`
/// reaches `max_hints`, or `current` already equals `answer`, the call is a
/// no-op. Under [`HintPolicy::ForceIncorrect`] the hint that exhausts the
/// budget sets `forced_incorrect`, whatever the buffer now holds.
#[must_use]
pub fn next_hint(
    current: &str,
    answer: &str,
    hints_used: u32,
    max_hints: u32,
    policy: HintPolicy,
) -> HintStep {
    if hints_used >= max_hints || current == answer {
        return HintStep {
            revealed: current.to_owned(),
            hints_used,
            forced_incorrect: false,
            changed: false,
        };
    }

    let target: Vec<char> = answer.chars().collect();
    let mut chars: Vec<char> = current.chars().collect();
    if chars.len() < target.len() {
        chars.resize(target.len(), PLACEHOLDER);
    }

    match target.iter().zip(&chars).position(|(want, have)| want != have) {
        Some(at) => chars[at] = target[at],
        None => chars.truncate(target.len()),
    }

    let hints_used = hints_used + 1;
    HintStep {
        revealed: chars.into_iter().collect(),
        hints_used,
        forced_incorrect: policy == HintPolicy::ForceIncorrect && hints_used >= max_hints,
        changed: true,
    }
}

/// Pre-filled buffer for a freshly shown item: the answer's length in
/// placeholders with one random non-whitespace character revealed.
#[must_use]
pub fn seed_freebie<R: Rng>(answer: &str, rng: &mut R) -> String {
    let chars: Vec<char> = answer.chars().collect();
    let candidates: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return String::new();
    }
    let pick = candidates[rng.random_range(0..candidates.len())];
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i == pick { *c } else { PLACEHOLDER })
        .collect()
}
