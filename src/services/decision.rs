//! Decision policy for the repair loop.
//!
//! After each apply-and-test iteration the loop consults this policy:
//! accept on green tests, retry with the next ranked candidate, request a
//! fresh proposal round, or abort when the budget is gone.

use crate::domain::models::Action;

/// Inputs to one decision.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext {
    /// Did the test suite pass after this iteration's patch?
    pub tests_passed: bool,
    /// Ranked candidates left in the current proposal round
    pub candidates_remaining: usize,
    /// Iterations consumed so far (including the current one)
    pub iterations_used: u32,
}

/// Bounded-retry decision policy.
#[derive(Debug, Clone, Copy)]
pub struct DecisionPolicy {
    /// Iteration budget for the whole loop
    pub max_iters: u32,
}

impl DecisionPolicy {
    pub fn new(max_iters: u32) -> Self {
        Self { max_iters }
    }

    /// Decide what the loop does next.
    pub fn decide(&self, ctx: DecisionContext) -> Action {
        if ctx.tests_passed {
            return Action::Accept;
        }
        if ctx.iterations_used >= self.max_iters {
            return Action::Abort;
        }
        if ctx.candidates_remaining > 0 {
            return Action::Retry;
        }
        Action::RequestPatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(tests_passed: bool, candidates_remaining: usize, iterations_used: u32) -> DecisionContext {
        DecisionContext {
            tests_passed,
            candidates_remaining,
            iterations_used,
        }
    }

    #[test]
    fn green_tests_accept_regardless_of_budget() {
        let policy = DecisionPolicy::new(5);
        assert_eq!(policy.decide(ctx(true, 0, 5)), Action::Accept);
        assert_eq!(policy.decide(ctx(true, 3, 1)), Action::Accept);
    }

    #[test]
    fn remaining_candidates_mean_retry() {
        let policy = DecisionPolicy::new(5);
        assert_eq!(policy.decide(ctx(false, 2, 1)), Action::Retry);
    }

    #[test]
    fn exhausted_candidates_request_fresh_round() {
        let policy = DecisionPolicy::new(5);
        assert_eq!(policy.decide(ctx(false, 0, 2)), Action::RequestPatches);
    }

    #[test]
    fn budget_exhaustion_aborts_even_with_candidates() {
        let policy = DecisionPolicy::new(3);
        assert_eq!(policy.decide(ctx(false, 4, 3)), Action::Abort);
        assert_eq!(policy.decide(ctx(false, 0, 3)), Action::Abort);
    }
}
