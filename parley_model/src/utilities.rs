use crate::domain::Domain;
use crate::ledger::FrequencyLedger;

/// Shape constant for the concave utility transform: compresses the gap
/// between the most-offered value and the rest.
const GAMMA: f64 = 0.25;
const EPS: f64 = 0.1;

/// Per-issue estimated desirability of each value to the counterpart,
/// in (0, 1]. Recomputed wholesale from the ledger on every update trigger,
/// never incrementally.
#[derive(Clone, Debug)]
pub struct ValueUtilities {
    per_issue: Vec<Vec<f64>>,
}

impl ValueUtilities {
    /// All-ones prior: before any evidence, every value looks equally good.
    pub fn uniform(domain: &Domain) -> Self {
        let per_issue = (0..domain.issue_count())
            .map(|i| vec![1.0; domain.value_count(i)])
            .collect();
        Self { per_issue }
    }

    #[inline]
    pub fn for_issue(&self, issue: usize) -> &[f64] {
        &self.per_issue[issue]
    }

    /// Recompute every issue's value utilities from the full bid history.
    ///
    /// Occurrences are discounted: the multiplier starts at 1 and is scaled
    /// after each bid by `0.98 + weight/50`, so evidence on issues currently
    /// believed important decays slower. Cost is O(history × issues); callers
    /// bound recomputation frequency via the update trigger.
    pub fn recompute_all(&mut self, ledger: &FrequencyLedger, weights: &[f64]) {
        for (issue, utilities) in self.per_issue.iter_mut().enumerate() {
            let discounting = 0.98 + weights[issue] / 50.0;
            let mut occurrences = vec![0.0_f64; utilities.len()];
            let mut discount = 1.0_f64;
            for bid in ledger.history() {
                occurrences[bid.value(issue)] += discount;
                discount *= discounting;
            }

            let max = occurrences.iter().cloned().fold(0.0_f64, f64::max);
            for (u, &occ) in utilities.iter_mut().zip(occurrences.iter()) {
                *u = ((EPS + occ) / (EPS + max)).powf(GAMMA);
            }
        }
    }
}
