//! Answer normalisation shared by every matcher.

/// Punctuation removed before comparing answers.
pub const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '"', '。', '，', '！', '？',
];

/// Strips punctuation, trims, and collapses whitespace runs to one space.
///
/// Total over all input (the empty string normalises to itself) and idempotent.
/// Case is preserved.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compares two answers after normalisation.
#[must_use]
pub fn equivalent(left: &str, right: &str) -> bool {
    normalize(left) == normalize(right)
}
