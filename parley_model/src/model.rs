use crate::cfg::ModelCfg;
use crate::concede::ConcedenceTracker;
use crate::domain::{Bid, Domain};
use crate::ledger::FrequencyLedger;
use crate::utilities::ValueUtilities;
use crate::weights;

/// Online estimate of the counterpart's preferences, rebuilt once per session
/// from the stream of received bids.
///
/// Driven strictly sequentially by the turn-taking protocol: `observe` per
/// received proposal, read-only queries in between. All recomputation happens
/// inside `observe` on the configured trigger; `evaluate` and the accessors
/// never mutate the estimates, so repeated reads between observations return
/// identical results.
#[derive(Clone, Debug)]
pub struct OpponentModel {
    domain: Domain,
    cfg: ModelCfg,
    ledger: FrequencyLedger,
    utilities: ValueUtilities,
    weights: Vec<f64>,
    concedence: ConcedenceTracker,
    confidence: f64,
    last_own_utility: f64,
}

impl OpponentModel {
    /// Uniform-prior model over `domain`: equal issue weights, all-ones value
    /// utilities, zero confidence.
    pub fn new(domain: Domain, cfg: ModelCfg) -> Self {
        let n = domain.issue_count();
        let ledger = FrequencyLedger::new(&domain);
        let utilities = ValueUtilities::uniform(&domain);
        Self {
            domain,
            cfg,
            ledger,
            utilities,
            weights: vec![1.0 / n as f64; n],
            concedence: ConcedenceTracker::default(),
            confidence: 0.0,
            last_own_utility: 0.0,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn cfg(&self) -> &ModelCfg {
        &self.cfg
    }

    /// Number of counterpart bids observed so far.
    pub fn observed_bids(&self) -> usize {
        self.ledger.len()
    }

    /// Feed one received proposal with its progress timestamp and our own
    /// utility for it. Returns true when the estimates were recomputed on
    /// this observation.
    ///
    /// Estimation failures are advisory — the previous estimates stand —
    /// so this never surfaces an error to the protocol layer.
    pub fn observe(&mut self, bid: Bid, progress: f64, own_utility: f64) -> bool {
        let previous = self.ledger.history().last().cloned();
        self.ledger.record(bid.clone(), progress);

        // Concedence reads the estimates as they stood when the bid arrived.
        if let Some(prev) = previous {
            if self.ledger.len() > self.cfg.warmup_bids {
                let own_delta = own_utility - self.last_own_utility;
                let model_delta = self.evaluate(&bid) - self.evaluate(&prev);
                self.concedence.observe(own_delta, model_delta);
            }
        }
        self.last_own_utility = own_utility;

        let len = self.ledger.len();
        if len >= self.cfg.warmup_bids && len % self.cfg.update_interval == 0 {
            self.recompute();
            return true;
        }
        false
    }

    fn recompute(&mut self) {
        self.utilities.recompute_all(&self.ledger, &self.weights);
        // On an estimation error the previous weights stand; the next
        // interval retries from a longer history.
        if let Ok(update) =
            weights::reestimate(&self.ledger, &self.utilities, &self.weights, &self.cfg)
        {
            if !update.baseline_kept {
                self.confidence += (1.0 - self.confidence) * 0.1;
            }
            self.weights = update.weights;
        }
    }

    /// Estimated opponent utility of `bid` under the current model state.
    pub fn evaluate(&self, bid: &Bid) -> f64 {
        self.weights
            .iter()
            .enumerate()
            .map(|(issue, w)| w * self.utilities.for_issue(issue)[bid.value(issue)])
            .sum()
    }

    /// Current issue weight estimate; strictly positive, sums to 1.
    pub fn issue_weights(&self) -> &[f64] {
        &self.weights
    }

    /// Current per-value utility estimate for `issue`, each in (0, 1].
    pub fn value_utilities(&self, issue: usize) -> &[f64] {
        self.utilities.for_issue(issue)
    }

    pub fn concedence_score(&self) -> f64 {
        self.concedence.score()
    }

    /// Estimation confidence in [0, 1); only ever moves toward 1.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Read access to the frequency ledger, for analysis tooling.
    pub fn ledger(&self) -> &FrequencyLedger {
        &self.ledger
    }
}
