//! Answer matching for typed and multiple-choice questions.
//!
//! Answers are compared after trimming surrounding whitespace and folding case.
//! Anything else, including inner spacing and spelling, must match exactly.

/// Normalize an answer for comparison.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Whether a given answer matches the expected one.
pub fn answers_match(given: &str, expected: &str) -> bool {
    normalize_answer(given) == normalize_answer(expected)
}

/// Whether a given answer matches any accepted answer.
pub fn matches_any<'a, I>(given: &str, accepted: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let given = normalize_answer(given);
    accepted
        .into_iter()
        .any(|candidate| normalize_answer(candidate) == given)
}
