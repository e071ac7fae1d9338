#[derive(Clone, Debug)]
pub struct ModelCfg {
    /// Upper bound on trial window sizes for the consensus estimator.
    pub max_window_size: usize,
    /// Observed bids before any estimation runs.
    pub warmup_bids: usize,
    /// Recompute estimates every this many observed bids.
    pub update_interval: usize,
    /// Significance threshold for the window-stability test.
    pub stability_alpha: f64,
    /// Stride between trial window sizes (candidates are 1, 1+stride, ...).
    pub window_stride: usize,
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self {
            max_window_size: 30,
            warmup_bids: 30,
            update_interval: 5,
            stability_alpha: 0.05,
            window_stride: 5,
        }
    }
}
