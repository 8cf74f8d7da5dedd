//! Challenge generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rampart_common::Operator;
use rand::Rng;

use super::Challenge;

/// Arithmetic challenge generator
pub struct ChallengeGenerator {
    min_operand: i32,
    max_operand: i32,
}

impl ChallengeGenerator {
    /// Operands are drawn uniformly from `min_operand..=max_operand`
    pub fn new(min_operand: i32, max_operand: i32) -> Self {
        Self {
            min_operand: min_operand.min(max_operand),
            max_operand: max_operand.max(min_operand),
        }
    }

    /// Generate a new challenge from the thread-local RNG
    pub fn generate(&self) -> Challenge {
        self.generate_with(&mut rand::rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Challenge {
        let a = rng.random_range(self.min_operand..=self.max_operand);
        let b = rng.random_range(self.min_operand..=self.max_operand);
        let operator = Operator::ALL[rng.random_range(0..Operator::ALL.len())];

        let challenge = Challenge::from_parts(generate_challenge_id(rng), a, b, operator);

        tracing::debug!(
            challenge_id = %challenge.id,
            operator = ?operator,
            "Generated arithmetic challenge"
        );

        challenge
    }
}

/// Generate a random challenge ID
fn generate_challenge_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
