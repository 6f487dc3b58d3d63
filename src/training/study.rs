//! Study: drives an objective through a fixed trial budget.
//!
//! The study only decides *which* configuration to try next. Evaluation is
//! the caller's objective, and results land in the caller's [`TrialLog`].

use anyhow::{Result, bail};
use rand::prelude::*;

use super::gridsearch::{
    ParameterPoint, SearchSpace, SearchStrategy, bayesian_next_sample, grid_point, grid_size,
    sample_points,
};
use super::metrics::TrialLog;

/// Maximizing parameter search over a [`SearchSpace`].
pub struct Study {
    space: SearchSpace,
    strategy: SearchStrategy,
    seed: u64,
    rng: StdRng,
    /// Pre-drawn points not yet handed out
    queue: Vec<ParameterPoint>,
}

impl Study {
    pub fn new(space: SearchSpace, strategy: SearchStrategy, seed: u64) -> Self {
        Self {
            space,
            strategy,
            seed,
            rng: StdRng::seed_from_u64(seed),
            queue: Vec::new(),
        }
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Run `n_trials` evaluations, recording each into `log`.
    ///
    /// Trials run strictly one after another. The first objective error
    /// stops the study and is returned; trials recorded so far stay in `log`.
    /// A grid whose size overflows `usize` is rejected before any trial runs.
    pub fn optimize<F>(&mut self, n_trials: usize, log: &mut TrialLog, mut objective: F) -> Result<()>
    where
        F: FnMut(&ParameterPoint) -> Result<f64>,
    {
        self.prepare(n_trials)?;

        for _ in 0..n_trials {
            let point = self.suggest(log);
            let score = objective(&point)?;
            let record = log.record(point, score);
            tracing::debug!(trial = record.number, score, "trial complete");
        }

        if let Some(best) = log.best() {
            tracing::info!(best_id = best.number, best_score = best.score, "study finished");
        }
        Ok(())
    }

    /// Pre-draw the batch for non-adaptive strategies (or the warm-up batch).
    fn prepare(&mut self, n_trials: usize) -> Result<()> {
        if let SearchStrategy::Grid { points_per_dim } = self.strategy {
            let ndim = self.space.ndim();
            let Some(total) = grid_size(ndim, points_per_dim) else {
                bail!(
                    "Grid of {} points per knob over {} knobs is too large",
                    points_per_dim,
                    ndim
                );
            };
            if total > n_trials {
                tracing::warn!(
                    grid = total,
                    budget = n_trials,
                    "grid larger than trial budget, truncating"
                );
            }
        }

        let mut points = sample_points(&self.space, self.strategy, n_trials, self.seed);
        points.truncate(n_trials);
        // Popped from the back
        points.reverse();
        self.queue = points;
        Ok(())
    }

    /// Next configuration to evaluate.
    fn suggest(&mut self, log: &TrialLog) -> ParameterPoint {
        if let Some(point) = self.queue.pop() {
            return point;
        }
        match self.strategy {
            // Grid smaller than the budget: cycle it.
            SearchStrategy::Grid { points_per_dim } => {
                let total = grid_size(self.space.ndim(), points_per_dim).unwrap_or(usize::MAX);
                grid_point(&self.space, points_per_dim, log.len() % total.max(1))
            }
            _ => bayesian_next_sample(&self.space, &log.history(), &mut self.rng),
        }
    }
}
