use rand::Rng;

/// A two-operand addition challenge shown before authentication is even
/// attempted. An empty or wrong answer blocks the login attempt and the
/// caller generates a fresh challenge.
pub struct Challenge {
    question: String,
    answer: String,
}

impl Challenge {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let a: u32 = rng.gen_range(5..=44);
        let b: u32 = rng.gen_range(1..=40);
        Self {
            question: format!("{} + {} =", a, b),
            answer: (a + b).to_string(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Exact string match against the expected sum, whitespace ignored.
    pub fn verify(&self, input: &str) -> bool {
        let input = input.trim();
        !input.is_empty() && input == self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Recover the expected sum from the rendered question.
    fn solve(question: &str) -> u32 {
        let mut parts = question.split(&['+', '='][..]);
        let a: u32 = parts.next().unwrap().trim().parse().unwrap();
        let b: u32 = parts.next().unwrap().trim().parse().unwrap();
        a + b
    }

    #[test]
    fn correct_answer_passes() {
        let challenge = Challenge::generate();
        let sum = solve(challenge.question());
        assert!(challenge.verify(&sum.to_string()));
        assert!(challenge.verify(&format!("  {} ", sum)));
    }

    #[test]
    fn wrong_or_empty_answers_fail() {
        let challenge = Challenge::generate();
        let sum = solve(challenge.question());
        assert!(!challenge.verify(&(sum + 1).to_string()));
        assert!(!challenge.verify(""));
        assert!(!challenge.verify("   "));
        assert!(!challenge.verify("not a number"));
    }

    #[test]
    fn operands_stay_in_range() {
        for _ in 0..100 {
            let challenge = Challenge::generate();
            let mut parts = challenge.question().split(&['+', '='][..]);
            let a: u32 = parts.next().unwrap().trim().parse().unwrap();
            let b: u32 = parts.next().unwrap().trim().parse().unwrap();
            assert!((5..=44).contains(&a));
            assert!((1..=40).contains(&b));
        }
    }
}
