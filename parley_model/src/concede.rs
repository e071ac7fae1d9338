use serde::{Deserialize, Serialize};

/// Seed for the contribution count; avoids division by zero before any
/// contributing event has been seen.
const COUNT_SEED: f64 = 1e-4;

/// Running estimate of how much the counterpart trades its own modeled
/// utility against ours. Positive score: they are conceding in our favor;
/// negative: they are extracting modeled gains at our expense.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConcedenceTracker {
    accumulator: f64,
    count: f64,
}

impl Default for ConcedenceTracker {
    fn default() -> Self {
        Self {
            accumulator: 0.0,
            count: COUNT_SEED,
        }
    }
}

impl ConcedenceTracker {
    /// Fold in one observed proposal's utility deltas: `own_delta` on our
    /// utility scale, `model_delta` on the modeled opponent scale.
    ///
    /// A move that improved our utility is credited by how much more we
    /// gained than the model says they gave up; a move that hurt us while
    /// (per the model) helping them is debited. A mutually unfortunate or
    /// neutral move carries no signal.
    pub fn observe(&mut self, own_delta: f64, model_delta: f64) {
        if own_delta > 0.0 {
            self.accumulator += own_delta - model_delta;
            self.count += 1.0;
        } else if model_delta > 0.0 {
            self.accumulator -= model_delta - own_delta;
            self.count += 1.0;
        }
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.accumulator / self.count
    }
}
