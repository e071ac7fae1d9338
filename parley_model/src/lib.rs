pub mod cfg;
pub mod concede;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod model;
pub mod stat;
pub mod utilities;
pub mod weights;

pub use cfg::ModelCfg;
pub use concede::ConcedenceTracker;
pub use domain::{Bid, Domain, IssueSpec};
pub use error::ModelError;
pub use ledger::FrequencyLedger;
pub use model::OpponentModel;
pub use stat::chi_square_pvalue;
pub use utilities::ValueUtilities;
pub use weights::{reestimate, WeightUpdate};
