//! Parameter search infrastructure.
//!
//! A study spends a fixed trial budget on configurations drawn from a
//! [`SearchSpace`], maximizing whatever objective the caller supplies:
//! 1. Describing the space (named knobs with linear or log ranges)
//! 2. Choosing configurations (grid, LHS, random, guided)
//! 3. Recording every trial in order ([`TrialLog`])
//! 4. Reporting the result (JSON report, terminal summary, PNG chart)
//!
//! ## Guided search
//!
//! The default strategy warms up with a Latin hypercube batch, then picks
//! each next point from a pool of random candidates by trading off
//! closeness to the best trial so far against distance from everything
//! already tried. Given the same seed and the same objective values, a
//! study proposes the same sequence of configurations.
//!
//! ## Usage
//!
//! ```bash
//! layoutfit graph.json --strategy bayesian --trials 100 --seed 1
//! layoutfit graph.json --strategy grid:4 --trials 256
//! ```

pub mod gridsearch;
pub mod metrics;
pub mod plots;
pub mod study;

pub use gridsearch::{
    ParamRange, ParameterPoint, SearchSpace, SearchStrategy, bayesian_next_sample, sample_points,
};
pub use metrics::{ScoreSummary, TrialLog, TrialRecord, TrialReport};
pub use plots::{LiveProgress, distribution_plot_name, plot_score_distribution};
pub use study::Study;
