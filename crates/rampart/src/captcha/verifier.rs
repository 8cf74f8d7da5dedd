//! Challenge answer verification.

use super::Challenge;

/// Result of checking a submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// Parsed, but not the expected number
    Incorrect,
    /// Answer was for a challenge that has since been replaced
    Stale,
    /// Not an integer
    Unparsable,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Verify an answer against the live challenge.
///
/// The answer must parse as an integer (surrounding whitespace ignored) and
/// match exactly. When the page echoes a challenge id it must be the live
/// one.
pub fn check_answer(challenge: &Challenge, challenge_id: Option<&str>, answer: &str) -> Verdict {
    if let Some(id) = challenge_id {
        if id != challenge.id {
            tracing::debug!(
                submitted = %id,
                live = %challenge.id,
                "Answer for a replaced challenge"
            );
            return Verdict::Stale;
        }
    }

    match answer.trim().parse::<i32>() {
        Ok(value) if value == challenge.expected_answer() => Verdict::Correct,
        Ok(_) => Verdict::Incorrect,
        Err(_) => Verdict::Unparsable,
    }
}
