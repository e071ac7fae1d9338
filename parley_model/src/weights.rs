use crate::cfg::ModelCfg;
use crate::error::ModelError;
use crate::ledger::FrequencyLedger;
use crate::stat::chi_square_pvalue;
use crate::utilities::ValueUtilities;

// ---------------------------------------------------------------------
// Window-consensus issue weight estimation
// ---------------------------------------------------------------------
//
// One candidate weight vector is replayed per trial window size, each
// re-running concession detection over the whole history at its own
// granularity; the candidates then vote. A candidate scores well when it
// looks like the other candidates and badly when it is indistinguishable
// from the uniform (uninformative) distribution.

/// Scale on the stability bump applied to issues that hold still while the
/// counterpart concedes elsewhere.
const BUMP_SCALE: f64 = 0.5;
/// Exponent on progress in the late-game damping term `1 - t^7`.
const PROGRESS_DECAY_POW: i32 = 7;
/// Divisor for the floor-lift that keeps every weight strictly positive.
/// Earlier revisions of this estimator used /2; /5 is the tuned value.
const FLOOR_LIFT_DIV: f64 = 5.0;

/// Result of one re-estimation pass.
#[derive(Clone, Debug)]
pub struct WeightUpdate {
    /// The adopted weight vector: strictly positive, sums to 1.
    pub weights: Vec<f64>,
    /// True when the previous baseline out-scored every trial candidate.
    pub baseline_kept: bool,
}

/// Re-estimate issue weights by window consensus.
///
/// Builds one candidate per trial window size `w` in `{1, 1+stride, ...}`
/// up to `min(len/5, max_window_size)`, plus the previous baseline as
/// candidate 0, then picks the candidate with the best consensus score.
/// Ties keep the first-seen candidate.
pub fn reestimate(
    ledger: &FrequencyLedger,
    utilities: &ValueUtilities,
    current: &[f64],
    cfg: &ModelCfg,
) -> Result<WeightUpdate, ModelError> {
    let len = ledger.len();
    let max_trial = (len / 5).min(cfg.max_window_size);

    let mut candidates: Vec<Vec<f64>> = vec![current.to_vec()];
    let mut w = 1usize;
    while w <= max_trial {
        candidates.push(candidate_for_window(ledger, utilities, current, cfg, w)?);
        w += cfg.window_stride;
    }

    let n = current.len();
    let uniform = vec![1.0 / n as f64; n];
    let k = candidates.len() as f64;

    let mut best = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for (i, cand) in candidates.iter().enumerate() {
        // Penalize uninformative candidates, reward cross-window agreement.
        let mut score = -k * chi_square_pvalue(cand, &uniform);
        for other in &candidates {
            score += chi_square_pvalue(cand, other);
        }
        if score > best_score {
            best = i;
            best_score = score;
        }
    }

    Ok(WeightUpdate {
        weights: candidates.swap_remove(best),
        baseline_kept: best == 0,
    })
}

/// Replay concession detection over the history at granularity `w`.
///
/// The cursor walks history indices `2w, 3w, ... len`. At each stop, every
/// issue's value-rate distribution over the window ending at `c - w` is
/// chi-squared against the window ending at `c`. Issues whose distributions
/// did not shift form the unchanged set; a utility drop on any shifting
/// issue flags a concession, and then every unchanged issue is bumped:
/// refusing to move while giving ground elsewhere is evidence the issue
/// matters. The bump grows with the history behind it and is damped near
/// the deadline, where behavior stops being diagnostic.
fn candidate_for_window(
    ledger: &FrequencyLedger,
    utilities: &ValueUtilities,
    current: &[f64],
    cfg: &ModelCfg,
    w: usize,
) -> Result<Vec<f64>, ModelError> {
    let mut weights = current.to_vec();
    let issues = weights.len();

    let mut c = 2 * w;
    while c <= ledger.len() {
        let mut unchanged: Vec<usize> = Vec::new();
        let mut concession = false;

        for issue in 0..issues {
            let previous = ledger.window_rates(issue, w, c - w)?;
            let current_rates = ledger.window_rates(issue, w, c)?;

            let p = chi_square_pvalue(&current_rates, &previous);
            if p > cfg.stability_alpha {
                unchanged.push(issue);
            } else {
                let values = utilities.for_issue(issue);
                if dot(&current_rates, values) < dot(&previous, values) {
                    concession = true;
                }
            }
        }

        if concession {
            let t = ledger.arrival(c - w);
            let delta =
                BUMP_SCALE * ((c - w) as f64).sqrt() * (1.0 - t.powi(PROGRESS_DECAY_POW));
            for &issue in &unchanged {
                weights[issue] += delta;
            }
        }

        c += w;
    }

    floor_lift(&mut weights);
    Ok(weights)
}

/// Lift weights off the floor and renormalize.
///
/// Subtracting `min/5` preserves ordering while guaranteeing strict
/// positivity; the double divide-by-sum pins the total to 1 under
/// floating-point drift. A fully flat vector (degenerate domain) becomes
/// the uniform distribution outright.
fn floor_lift(weights: &mut [f64]) {
    let min = weights.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = weights.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max - min < 1e-12 {
        let u = 1.0 / weights.len() as f64;
        weights.iter_mut().for_each(|w| *w = u);
        return;
    }

    weights.iter_mut().for_each(|w| *w -= min / FLOOR_LIFT_DIV);
    for _ in 0..2 {
        let sum: f64 = weights.iter().sum();
        weights.iter_mut().for_each(|w| *w /= sum);
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::floor_lift;

    #[test]
    fn floor_lift_keeps_ordering_and_positivity() {
        let mut w = vec![0.1, 3.0, 0.7];
        floor_lift(&mut w);
        assert!(w.iter().all(|&x| x > 0.0));
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(w[1] > w[2] && w[2] > w[0]);
    }

    #[test]
    fn floor_lift_flat_vector_becomes_uniform() {
        let mut w = vec![0.25; 4];
        floor_lift(&mut w);
        assert!(w.iter().all(|&x| (x - 0.25).abs() < 1e-12));
    }
}
