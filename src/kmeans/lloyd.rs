//! Host-side half of a Lloyd pass, shared by both strategies: accumulate
//! assigned points, move centers to their means, count membership changes,
//! and decide whether another pass runs.

use crate::config::KMeansConfig;
use ndarray::{Array2, ArrayView1};
use tracing::debug;

/// Membership value before the first pass; never equal to a real cluster.
pub(crate) const UNASSIGNED: usize = usize::MAX;

/// Per-cluster running sums and counts for the pass in progress.
pub(crate) struct Accumulator {
    sums: Array2<f64>,
    counts: Vec<usize>,
    changed: usize,
}

impl Accumulator {
    pub(crate) fn new(k: usize, dim: usize) -> Self {
        Self {
            sums: Array2::zeros((k, dim)),
            counts: vec![0; k],
            changed: 0,
        }
    }

    /// Record that point `i` now belongs to `cluster`.
    #[inline]
    pub(crate) fn assign(
        &mut self,
        membership: &mut [usize],
        i: usize,
        cluster: usize,
        point: ArrayView1<f64>,
    ) {
        if membership[i] != cluster {
            self.changed += 1;
        }
        membership[i] = cluster;
        self.counts[cluster] += 1;
        let mut sum = self.sums.row_mut(cluster);
        sum += &point;
    }

    /// Replace every non-empty cluster's center with the mean of its points
    /// and reset for the next pass. A cluster that received no points keeps
    /// its previous center untouched.
    ///
    /// Returns the fraction of the `n` points whose membership changed.
    pub(crate) fn finish_pass(&mut self, centers: &mut Array2<f64>, n: usize) -> f64 {
        for (c, mut center) in centers.rows_mut().into_iter().enumerate() {
            let count = self.counts[c];
            if count > 0 {
                let size = count as f64;
                center.zip_mut_with(&self.sums.row(c), |dst, &sum| *dst = sum / size);
            }
        }

        let delta = self.changed as f64 / n as f64;
        self.sums.fill(0.0);
        self.counts.iter_mut().for_each(|count| *count = 0);
        self.changed = 0;
        delta
    }
}

/// Convergence test and iteration cap.
///
/// Another pass runs while `delta > threshold` and the post-incremented loop
/// counter was still below `max_iterations`, so at most `max_iterations + 1`
/// passes execute.
pub(crate) struct LoopControl {
    threshold: f64,
    max_iterations: usize,
    counter: usize,
    passes: usize,
}

impl LoopControl {
    pub(crate) fn new(config: &KMeansConfig) -> Self {
        Self {
            threshold: config.threshold,
            max_iterations: config.max_iterations,
            counter: 0,
            passes: 0,
        }
    }

    /// Called once after every pass. Returns true if another pass should run.
    pub(crate) fn next(&mut self, delta: f64) -> bool {
        self.passes += 1;
        debug!(pass = self.passes, delta, "lloyd pass complete");

        if delta <= self.threshold {
            return false;
        }
        let below_cap = self.counter < self.max_iterations;
        self.counter += 1;
        below_cap
    }

    pub(crate) fn passes(&self) -> usize {
        self.passes
    }

    pub(crate) fn converged(&self, delta: f64) -> bool {
        delta <= self.threshold
    }
}
