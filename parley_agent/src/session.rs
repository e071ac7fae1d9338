//! Session runner: owns the opponent model and the strategy state for one
//! bilateral negotiation, and routes protocol events between them.
//!
//! No IO. The estimate trace is accumulated in memory and exported as plain
//! data; callers decide how and where to persist it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use parley_model::{Bid, Domain, ModelCfg, OpponentModel};

use crate::adapter::{SessionEvent, UtilitySpace};
use crate::bidspace::BidStages;
use crate::strategy::{Action, BiddingStrategy, StrategyCfg};

/// One row of the estimate trace, captured at every model recomputation.
/// This is the data the window-size/threshold parameter sweeps consume.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimateSnapshot {
    pub progress: f64,
    pub weights: Vec<f64>,
    pub confidence: f64,
    pub concedence: f64,
}

/// Storage-agnostic export of the full trace.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EstimateTrace {
    pub entries: Vec<EstimateSnapshot>,
}

/// One negotiation session from the agent's side.
pub struct NegotiationSession<U: UtilitySpace> {
    domain: Domain,
    utility_space: U,
    model_cfg: ModelCfg,
    strategy: BiddingStrategy,
    model: Option<OpponentModel>,
    last_received: Option<Bid>,
    own_history: Vec<Bid>,
    trace: Vec<EstimateSnapshot>,
    finished: bool,
}

impl<U: UtilitySpace> NegotiationSession<U> {
    pub fn new(domain: Domain, utility_space: U, model_cfg: ModelCfg, strategy_cfg: StrategyCfg) -> Self {
        let stages = BidStages::build(&domain, &utility_space);
        info!(
            issues = domain.issue_count(),
            bid_space = domain.bid_space_size(),
            "negotiation session initialized"
        );
        Self {
            domain,
            utility_space,
            model_cfg,
            strategy: BiddingStrategy::new(stages, strategy_cfg),
            model: None,
            last_received: None,
            own_history: Vec::new(),
            trace: Vec::new(),
            finished: false,
        }
    }

    /// Feed one protocol event. Returns the agent's action on `YourTurn`,
    /// `None` otherwise.
    pub fn handle(&mut self, event: SessionEvent) -> Option<Action> {
        if self.finished {
            return None;
        }
        match event {
            SessionEvent::OpponentOffer { bid, progress } => {
                self.on_offer(bid, progress);
                None
            }
            SessionEvent::YourTurn { progress } => Some(self.decide(progress)),
            SessionEvent::Finished => {
                self.finished = true;
                info!(
                    observed = self.model.as_ref().map(|m| m.observed_bids()).unwrap_or(0),
                    "session finished"
                );
                None
            }
        }
    }

    fn on_offer(&mut self, bid: Bid, progress: f64) {
        // The model needs the domain catalogue, so it is created on the
        // first received offer rather than up front.
        let model = self.model.get_or_insert_with(|| {
            OpponentModel::new(self.domain.clone(), self.model_cfg.clone())
        });
        let own_utility = self.utility_space.utility(&bid);
        let recomputed = model.observe(bid.clone(), progress, own_utility);
        if recomputed {
            self.trace.push(EstimateSnapshot {
                progress,
                weights: model.issue_weights().to_vec(),
                confidence: model.confidence(),
                concedence: model.concedence_score(),
            });
            debug!(
                observed = model.observed_bids(),
                confidence = model.confidence(),
                "estimates recomputed"
            );
        }
        self.last_received = Some(bid);
    }

    fn decide(&mut self, progress: f64) -> Action {
        if let (Some(standing), Some(own_previous)) =
            (self.last_received.as_ref(), self.own_history.last())
        {
            if self
                .strategy
                .should_accept(standing, own_previous, &self.utility_space, progress)
            {
                info!(progress, "accepting standing offer");
                return Action::Accept;
            }
        }

        let bid = match (self.model.as_ref(), self.last_received.as_ref()) {
            (Some(model), Some(last_received)) => {
                self.strategy.advance_stage(
                    progress,
                    model.concedence_score(),
                    self.own_history.len(),
                );
                self.strategy
                    .next_offer(model, last_received, &self.own_history, progress)
            }
            // Nothing received yet: lead with our best bid.
            _ => self.strategy.opening_offer(),
        };

        debug!(progress, stage = self.strategy.stage(), "countering");
        self.own_history.push(bid.clone());
        Action::Offer(bid)
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn model(&self) -> Option<&OpponentModel> {
        self.model.as_ref()
    }

    pub fn own_history(&self) -> &[Bid] {
        &self.own_history
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn trace(&self) -> &[EstimateSnapshot] {
        &self.trace
    }

    pub fn export_trace(&self) -> EstimateTrace {
        EstimateTrace {
            entries: self.trace.clone(),
        }
    }
}
