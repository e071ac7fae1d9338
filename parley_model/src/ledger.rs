use crate::domain::{Bid, Domain};
use crate::error::ModelError;

/// Laplace-style smoothing constant for windowed rates. Keeps zero-frequency
/// values from collapsing a rate vector to zero.
pub const SMOOTHING_EPS: f64 = 0.1;

/// Append-only frequency bookkeeping over the received-bid history.
///
/// Per issue the ledger owns an arena of cumulative count snapshots, one row
/// per observed bid plus the initial all-zero row. Row `k` equals row `k-1`
/// with the count of bid `k-1`'s value incremented, so row `k` sums to `k`
/// exactly. `record` copies only the previous row per issue and never walks
/// the history.
#[derive(Clone, Debug)]
pub struct FrequencyLedger {
    /// `snapshots[issue][k][value]` — cumulative count arena.
    snapshots: Vec<Vec<Vec<u32>>>,
    history: Vec<Bid>,
    arrivals: Vec<f64>,
}

impl FrequencyLedger {
    pub fn new(domain: &Domain) -> Self {
        let snapshots = (0..domain.issue_count())
            .map(|i| vec![vec![0u32; domain.value_count(i)]])
            .collect();
        Self {
            snapshots,
            history: Vec::new(),
            arrivals: Vec::new(),
        }
    }

    /// Number of observed bids.
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> &[Bid] {
        &self.history
    }

    /// Progress timestamp recorded for history index `k`.
    #[inline]
    pub fn arrival(&self, k: usize) -> f64 {
        self.arrivals[k]
    }

    /// Cumulative counts for `issue` after `k` observed bids.
    pub fn counts_at(&self, issue: usize, k: usize) -> &[u32] {
        &self.snapshots[issue][k]
    }

    /// Append one bid. The bid must come from the same domain the ledger was
    /// built for (enforced by `Bid` construction).
    pub fn record(&mut self, bid: Bid, progress: f64) {
        for (issue, arena) in self.snapshots.iter_mut().enumerate() {
            let mut row = arena
                .last()
                .expect("ledger arena always holds the zero row")
                .clone();
            row[bid.value(issue)] += 1;
            arena.push(row);
        }
        self.history.push(bid);
        self.arrivals.push(progress);
    }

    /// Smoothed per-value rate over the window of `window` bids ending at
    /// history index `end` (exclusive, i.e. counts up to snapshot `end`).
    ///
    /// Rejects `end < window` and out-of-range `end` rather than reading
    /// outside the arena.
    pub fn window_rates(
        &self,
        issue: usize,
        window: usize,
        end: usize,
    ) -> Result<Vec<f64>, ModelError> {
        if issue >= self.snapshots.len() {
            return Err(ModelError::IssueOutOfRange(issue));
        }
        if window == 0 || end < window || end > self.len() {
            return Err(ModelError::InsufficientHistory { window, end });
        }

        let newer = &self.snapshots[issue][end];
        let older = &self.snapshots[issue][end - window];
        let n = newer.len() as f64;
        let w = window as f64;
        let smear = SMOOTHING_EPS * w / n;

        Ok(newer
            .iter()
            .zip(older.iter())
            .map(|(&hi, &lo)| (smear + f64::from(hi - lo)) / w)
            .collect())
    }
}
