//! Arithmetic human-verification challenge.
//!
//! Each form holds exactly one live [`Challenge`]. The expected answer never
//! leaves the process: only the rendered question and an opaque id are
//! exposed to the page.

mod generator;
mod verifier;

pub use generator::ChallengeGenerator;
pub use verifier::{Verdict, check_answer};

use rampart_common::Operator;
use serde::Serialize;

/// A live arithmetic challenge
#[derive(Debug, Clone, Serialize)]
pub struct Challenge {
    /// Random opaque id, lets a stale answer be told apart from a wrong one
    pub id: String,

    pub lhs: i32,
    pub rhs: i32,
    pub operator: Operator,

    /// Expected answer (server-side only, never serialized)
    #[serde(skip_serializing)]
    answer: i32,
}

impl Challenge {
    /// Build a challenge from raw operands.
    ///
    /// Subtraction operands are reordered larger-minus-smaller so the
    /// answer is never negative.
    pub fn from_parts(id: String, a: i32, b: i32, operator: Operator) -> Self {
        let (lhs, rhs) = match operator {
            Operator::Subtract => (a.max(b), a.min(b)),
            _ => (a, b),
        };
        Self {
            id,
            lhs,
            rhs,
            operator,
            answer: operator.apply(lhs, rhs),
        }
    }

    /// Question text, e.g. `7 - 3 = ?`
    pub fn question(&self) -> String {
        format!("{} {} {} = ?", self.lhs, self.operator.symbol(), self.rhs)
    }

    pub fn expected_answer(&self) -> i32 {
        self.answer
    }

    pub fn view(&self) -> ChallengeView {
        ChallengeView {
            id: self.id.clone(),
            question: self.question(),
        }
    }
}

/// What the page gets to see of a challenge
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeView {
    pub id: String,
    pub question: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtract_orders_operands() {
        let challenge = Challenge::from_parts("c1".into(), 3, 7, Operator::Subtract);
        assert_eq!(challenge.question(), "7 - 3 = ?");
        assert_eq!(challenge.expected_answer(), 4);

        let challenge = Challenge::from_parts("c2".into(), 7, 3, Operator::Subtract);
        assert_eq!(challenge.question(), "7 - 3 = ?");
        assert_eq!(challenge.expected_answer(), 4);
    }

    #[test]
    fn test_multiply_renders_times_sign() {
        let challenge = Challenge::from_parts("c".into(), 4, 6, Operator::Multiply);
        assert_eq!(challenge.question(), "4 × 6 = ?");
        assert_eq!(challenge.expected_answer(), 24);
    }

    #[test]
    fn test_answer_not_serialized() {
        let challenge = Challenge::from_parts("c".into(), 2, 5, Operator::Add);
        let json = serde_json::to_value(&challenge).unwrap();
        assert!(json.get("answer").is_none());
        assert_eq!(json["lhs"], 2);
    }
}
