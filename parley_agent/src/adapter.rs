//! Protocol adapter layer: the session consumes `SessionEvent`s and an
//! externally supplied utility space; how those are produced (socket, FFI,
//! test harness) is the caller's business.

use parley_model::{Bid, Domain};

use crate::error::AgentError;

/// The agent's own preference profile over the domain. Supplied externally;
/// the session only ever reads it.
pub trait UtilitySpace {
    /// Utility of `bid` in [0, 1].
    fn utility(&self, bid: &Bid) -> f64;
}

/// The common linear-additive profile: normalized issue weights and a
/// per-issue table of value utilities.
#[derive(Clone, Debug)]
pub struct LinearAdditiveUtilitySpace {
    weights: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl LinearAdditiveUtilitySpace {
    pub fn new(
        domain: &Domain,
        weights: Vec<f64>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, AgentError> {
        if weights.len() != domain.issue_count() || values.len() != domain.issue_count() {
            return Err(AgentError::ShapeMismatch(format!(
                "{} weight(s) and {} value table(s) for {} issue(s)",
                weights.len(),
                values.len(),
                domain.issue_count()
            )));
        }
        for (issue, table) in values.iter().enumerate() {
            if table.len() != domain.value_count(issue) {
                return Err(AgentError::ShapeMismatch(format!(
                    "issue {issue} has {} values but its table holds {}",
                    domain.value_count(issue),
                    table.len()
                )));
            }
        }
        let sum: f64 = weights.iter().sum();
        if !(sum > 0.0) {
            return Err(AgentError::ShapeMismatch(
                "issue weights must sum to a positive total".into(),
            ));
        }
        let weights = weights.into_iter().map(|w| w / sum).collect();
        Ok(Self { weights, values })
    }
}

impl UtilitySpace for LinearAdditiveUtilitySpace {
    fn utility(&self, bid: &Bid) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(issue, w)| w * self.values[issue][bid.value(issue)])
            .sum()
    }
}

/// One protocol inform, reduced to what the session needs.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// The counterpart proposed `bid` at the given progress in [0, 1].
    OpponentOffer { bid: Bid, progress: f64 },
    /// It is our turn to accept the standing offer or counter.
    YourTurn { progress: f64 },
    /// The session ended (agreement or deadline).
    Finished,
}
