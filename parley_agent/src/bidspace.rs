use parley_model::{Bid, Domain};

use crate::adapter::UtilitySpace;

/// Number of own-utility buckets: stage 0 holds bids at 0.95..1.0 utility,
/// stage 1 at 0.90..0.95, and so on.
pub const STAGE_COUNT: usize = 20;

/// Enumerate every bid in the domain (cartesian product, odometer order).
///
/// Cost is O(product of value-set sizes); callers enumerate once per session.
pub fn enumerate_bids(domain: &Domain) -> Vec<Bid> {
    let issues = domain.issue_count();
    let mut out = Vec::with_capacity(domain.bid_space_size());
    let mut odometer = vec![0u32; issues];
    loop {
        out.push(
            Bid::new(domain, odometer.clone()).expect("odometer stays inside the domain"),
        );
        let mut issue = issues;
        loop {
            if issue == 0 {
                return out;
            }
            issue -= 1;
            odometer[issue] += 1;
            if (odometer[issue] as usize) < domain.value_count(issue) {
                break;
            }
            odometer[issue] = 0;
        }
    }
}

/// The full bid space bucketed into descending own-utility stages.
#[derive(Clone, Debug)]
pub struct BidStages {
    stages: Vec<Vec<Bid>>,
}

impl BidStages {
    pub fn build(domain: &Domain, utility: &dyn UtilitySpace) -> Self {
        let mut stages = vec![Vec::new(); STAGE_COUNT];
        for bid in enumerate_bids(domain) {
            let u = utility.utility(&bid);
            stages[stage_index(u)].push(bid);
        }
        Self { stages }
    }

    #[inline]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// All bids in stages 0..=`stage`, best own-utility bucket first.
    pub fn up_to(&self, stage: usize) -> impl Iterator<Item = &Bid> {
        let last = stage.min(self.stages.len() - 1);
        self.stages[..=last].iter().flatten()
    }

    /// Highest-utility bid available; the session's opening proposal.
    pub fn best(&self) -> Option<&Bid> {
        self.stages.iter().flatten().next()
    }
}

fn stage_index(utility: f64) -> usize {
    let n = STAGE_COUNT as f64;
    let idx = n - (utility.clamp(0.0, 1.0) * n).ceil();
    (idx as usize).min(STAGE_COUNT - 1)
}

#[cfg(test)]
mod tests {
    use super::stage_index;

    #[test]
    fn stage_index_buckets() {
        assert_eq!(stage_index(1.0), 0);
        assert_eq!(stage_index(0.96), 0);
        assert_eq!(stage_index(0.93), 1);
        assert_eq!(stage_index(0.0), 19);
        assert_eq!(stage_index(0.01), 19);
    }
}
