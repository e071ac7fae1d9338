use parley_model::{Bid, OpponentModel};

use crate::adapter::UtilitySpace;
use crate::bidspace::BidStages;

#[derive(Clone, Debug)]
pub struct StrategyCfg {
    /// Progress past which a good-enough standing offer is accepted.
    pub accept_progress: f64,
    /// Progress budget per stage before the next bucket unlocks.
    pub stage_step: f64,
    /// How strongly the concedence score accelerates stage advancement.
    pub concedence_gain: f64,
    /// Own proposals within this many turns are not repeated.
    pub repeat_window: usize,
    /// Own offers made before concedence-driven staging kicks in.
    pub staging_min_history: usize,
}

impl Default for StrategyCfg {
    fn default() -> Self {
        Self {
            accept_progress: 0.8,
            stage_step: 0.15,
            concedence_gain: 10.0,
            repeat_window: 3,
            staging_min_history: 30,
        }
    }
}

/// The agent's move for one turn.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Accept the counterpart's standing offer.
    Accept,
    /// Counter with this bid.
    Offer(Bid),
}

/// Stage-based accept-or-counter policy.
///
/// Starts proposing only from the top own-utility bucket and unlocks lower
/// buckets as the session progresses; a counterpart that the model believes
/// is conceding speeds the unlock up, a hardliner slows it down.
#[derive(Clone, Debug)]
pub struct BiddingStrategy {
    cfg: StrategyCfg,
    stages: BidStages,
    stage: usize,
}

impl BiddingStrategy {
    pub fn new(stages: BidStages, cfg: StrategyCfg) -> Self {
        Self {
            cfg,
            stages,
            stage: 0,
        }
    }

    #[inline]
    pub fn stage(&self) -> usize {
        self.stage
    }

    /// Accept when the deadline is near and the standing offer beats our own
    /// previous proposal.
    pub fn should_accept(
        &self,
        standing: &Bid,
        own_previous: &Bid,
        utility: &dyn UtilitySpace,
        progress: f64,
    ) -> bool {
        progress > self.cfg.accept_progress
            && utility.utility(standing) > utility.utility(own_previous)
    }

    /// Unlock the next bucket when concedence-scaled progress has outrun the
    /// current stage's budget. Inert until enough own offers are out for the
    /// concedence score to mean something.
    pub fn advance_stage(&mut self, progress: f64, concedence: f64, own_offers: usize) {
        if own_offers <= self.cfg.staging_min_history {
            return;
        }
        let scale = 1.0 + concedence * self.cfg.concedence_gain;
        if progress * scale > (self.stage as f64 + 1.0) * self.cfg.stage_step {
            self.stage += 1;
        }
    }

    /// Opening proposal before anything has been received.
    pub fn opening_offer(&self) -> Bid {
        self.stages
            .best()
            .expect("a validated domain has at least one bid")
            .clone()
    }

    /// Pick the best-scoring unlocked bid that we did not just propose,
    /// unlocking further stages if the current ones have nothing fresh left.
    pub fn next_offer(
        &mut self,
        model: &OpponentModel,
        last_received: &Bid,
        own_history: &[Bid],
        progress: f64,
    ) -> Bid {
        let recent_start = own_history.len().saturating_sub(self.cfg.repeat_window);
        let recent = &own_history[recent_start..];

        loop {
            let mut best: Option<&Bid> = None;
            let mut best_score = 0.0_f64;
            for bid in self.stages.up_to(self.stage) {
                if recent.contains(bid) {
                    continue;
                }
                let score = score_bid(bid, last_received, model, progress);
                if score > best_score {
                    best_score = score;
                    best = Some(bid);
                }
            }
            if let Some(bid) = best {
                return bid.clone();
            }
            if self.stage + 1 < self.stages.stage_count() {
                self.stage += 1;
                continue;
            }
            // Every bucket is unlocked and everything fresh scored zero:
            // fall back to the best-scoring bid regardless of recency.
            let mut fallback = None;
            let mut fallback_score = f64::NEG_INFINITY;
            for bid in self.stages.up_to(self.stage) {
                let score = score_bid(bid, last_received, model, progress);
                if score > fallback_score {
                    fallback_score = score;
                    fallback = Some(bid);
                }
            }
            return fallback
                .expect("a validated domain has at least one bid")
                .clone();
        }
    }
}

/// Heuristic bid score: early in the session, mirror the counterpart's last
/// offer (syntactic match fraction); toward the deadline, weigh the modeled
/// opponent utility instead.
pub fn score_bid(bid: &Bid, last_received: &Bid, model: &OpponentModel, progress: f64) -> f64 {
    let match_fraction =
        bid.matching_values(last_received) as f64 / bid.issue_count() as f64;
    (1.0 - progress) * match_fraction + progress * model.evaluate(bid)
}
