//! parley_agent
//!
//! Outside-world facing negotiation layer for `parley_model`.
//!
//! Responsibilities:
//! - own one `OpponentModel` per negotiation session
//! - convert protocol informs into session events via adapters
//! - bucket the bid space and run the accept-or-counter strategy
//! - accumulate the estimate trace for offline parameter sweeps
//!
//! Non-goals:
//! - no IO
//! - no async
//! - no estimation logic (lives in the model core)

pub mod adapter;
pub mod bidspace;
pub mod error;
pub mod session;
pub mod strategy;

pub use adapter::{LinearAdditiveUtilitySpace, SessionEvent, UtilitySpace};
pub use bidspace::{enumerate_bids, BidStages};
pub use error::AgentError;
pub use session::{EstimateSnapshot, EstimateTrace, NegotiationSession};
pub use strategy::{Action, BiddingStrategy, StrategyCfg};
