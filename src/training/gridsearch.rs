//! Parameter space exploration for layout tuning.
//!
//! ## Search Strategies
//!
//! | Strategy         | When to use                                          |
//! |------------------|------------------------------------------------------|
//! | Grid             | Few knobs, want an exhaustive sweep                  |
//! | LatinHypercube   | Medium budget, want uniform coverage                 |
//! | Random           | Baseline comparison                                  |
//! | Bayesian         | Expensive layouts, want guided sampling (default)    |
//!
//! ## Latin Hypercube Sampling
//!
//! Each dimension is divided into N equal strata and exactly one sample is
//! placed in each stratum per dimension.
//!
//! ## Guided (Bayesian-style) Sampling
//!
//! After a space-filling warm-up, each new point is the best of a batch of
//! random candidates under an acquisition that balances distance from
//! explored points against closeness to high-scoring ones.
//!
//! ## Parameter Encoding
//!
//! All parameters are normalized to [0, 1] internally, then decoded to their
//! actual ranges for evaluation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// A single point in parameter space: knob name -> value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterPoint {
    values: BTreeMap<String, f64>,
}

impl ParameterPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// (name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, f64)> for ParameterPoint {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Range specification for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    /// If true, sample in log space (needs min > 0)
    pub log_scale: bool,
}

impl ParamRange {
    pub fn linear(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            log_scale: false,
        }
    }

    pub fn log(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            log_scale: true,
        }
    }

    /// Convert normalized [0, 1] value to actual parameter value.
    pub fn decode(&self, normalized: f64) -> f64 {
        let t = normalized.clamp(0.0, 1.0);
        if self.log_scale {
            let log_min = self.min.ln();
            let log_max = self.max.ln();
            (log_min + t * (log_max - log_min)).exp()
        } else {
            self.min + t * (self.max - self.min)
        }
    }

    /// Convert actual value to normalized [0, 1].
    pub fn encode(&self, value: f64) -> f64 {
        let value = value.clamp(self.min, self.max);
        let (lo, hi, v) = if self.log_scale {
            (self.min.ln(), self.max.ln(), value.ln())
        } else {
            (self.min, self.max, value)
        };
        if hi > lo { (v - lo) / (hi - lo) } else { 0.5 }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Named parameter ranges making up a search space.
///
/// Names are kept sorted so normalized vectors have a stable dimension order.
#[derive(Debug, Clone, Default)]
pub struct SearchSpace {
    pub ranges: BTreeMap<String, ParamRange>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, range: ParamRange) -> Self {
        self.ranges.insert(name.into(), range);
        self
    }

    /// Decode a normalized vector [0, 1]^D into a ParameterPoint.
    pub fn decode(&self, normalized: &[f64]) -> ParameterPoint {
        assert_eq!(normalized.len(), self.ndim(), "Dimension mismatch");
        self.ranges
            .iter()
            .zip(normalized)
            .map(|((name, range), &n)| (name.clone(), range.decode(n)))
            .collect()
    }

    /// Encode a point into normalized coordinates.
    /// Knobs missing from the point sit at the middle of their range.
    pub fn encode(&self, point: &ParameterPoint) -> Vec<f64> {
        self.ranges
            .iter()
            .map(|(name, range)| point.get(name).map(|v| range.encode(v)).unwrap_or(0.5))
            .collect()
    }

    /// Sorted list of parameter names.
    pub fn param_names(&self) -> Vec<String> {
        self.ranges.keys().cloned().collect()
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.ranges.len()
    }

    /// Normalized L2 distance between two points (0 = same, 1 = opposite corners).
    pub fn normalized_distance(&self, a: &ParameterPoint, b: &ParameterPoint) -> f64 {
        if self.ndim() == 0 {
            return 0.0;
        }
        let sum_sq: f64 = self
            .encode(a)
            .iter()
            .zip(self.encode(b))
            .map(|(av, bv)| (av - bv).powi(2))
            .sum();
        (sum_sq / self.ndim() as f64).sqrt()
    }
}

/// Search strategy for parameter exploration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SearchStrategy {
    /// Full grid search (cartesian product of discrete values)
    Grid { points_per_dim: usize },
    /// Latin Hypercube Sampling (uniform space-filling)
    LatinHypercube,
    /// Random uniform sampling
    Random,
    /// Warm-up sampling followed by guided acquisition
    Bayesian,
}

impl Default for SearchStrategy {
    fn default() -> Self {
        Self::Bayesian
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid { points_per_dim } => write!(f, "grid:{}", points_per_dim),
            Self::LatinHypercube => f.write_str("lhs"),
            Self::Random => f.write_str("random"),
            Self::Bayesian => f.write_str("bayesian"),
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    /// Accepts `random`, `lhs`, `bayesian`, `grid` or `grid:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "random" => Ok(Self::Random),
            "lhs" | "latin-hypercube" => Ok(Self::LatinHypercube),
            "bayesian" | "guided" => Ok(Self::Bayesian),
            "grid" => Ok(Self::Grid { points_per_dim: 3 }),
            _ => {
                let Some(n) = s.strip_prefix("grid:") else {
                    return Err(format!(
                        "unknown search strategy '{}' (expected random, lhs, bayesian, grid[:N])",
                        s
                    ));
                };
                match n.parse::<usize>() {
                    Ok(points_per_dim) if points_per_dim > 0 => Ok(Self::Grid { points_per_dim }),
                    _ => Err(format!("invalid grid resolution '{}'", n)),
                }
            }
        }
    }
}

impl TryFrom<String> for SearchStrategy {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SearchStrategy> for String {
    fn from(strategy: SearchStrategy) -> Self {
        strategy.to_string()
    }
}

/// Sample points from parameter space using specified strategy.
///
/// Grid returns the first `n_samples` points of the cartesian product (all
/// of it when smaller); Bayesian returns only its warm-up batch.
pub fn sample_points(
    space: &SearchSpace,
    strategy: SearchStrategy,
    n_samples: usize,
    seed: u64,
) -> Vec<ParameterPoint> {
    let mut rng = StdRng::seed_from_u64(seed);

    match strategy {
        SearchStrategy::Grid { points_per_dim } => sample_grid(space, points_per_dim, n_samples),
        SearchStrategy::LatinHypercube => sample_lhs(space, n_samples, &mut rng),
        SearchStrategy::Random => sample_random(space, n_samples, &mut rng),
        SearchStrategy::Bayesian => sample_lhs(space, n_samples.min(WARMUP_SAMPLES), &mut rng),
    }
}

/// Space-filling samples drawn before guided acquisition starts.
pub const WARMUP_SAMPLES: usize = 10;

/// Random candidates scored per guided acquisition step.
const ACQUISITION_CANDIDATES: usize = 1000;

/// Weight of exploitation (closeness to good points) against exploration.
const EXPLOITATION_WEIGHT: f64 = 0.3;

/// Number of points in a full grid, `None` if it does not fit in `usize`.
pub fn grid_size(ndim: usize, points_per_dim: usize) -> Option<usize> {
    u32::try_from(ndim)
        .ok()
        .and_then(|ndim| points_per_dim.checked_pow(ndim))
}

/// The `idx`-th point of the grid, first dimension varying fastest.
pub fn grid_point(space: &SearchSpace, points_per_dim: usize, idx: usize) -> ParameterPoint {
    let ndim = space.ndim();
    let mut normalized = Vec::with_capacity(ndim);
    let mut remaining = idx;

    for _ in 0..ndim {
        let dim_idx = remaining % points_per_dim.max(1);
        remaining /= points_per_dim.max(1);

        let t = if points_per_dim > 1 {
            dim_idx as f64 / (points_per_dim - 1) as f64
        } else {
            0.5
        };
        normalized.push(t);
    }

    space.decode(&normalized)
}

/// Grid search: leading `limit` points of the cartesian product.
fn sample_grid(space: &SearchSpace, points_per_dim: usize, limit: usize) -> Vec<ParameterPoint> {
    let count = grid_size(space.ndim(), points_per_dim).map_or(limit, |total| total.min(limit));
    (0..count)
        .map(|idx| grid_point(space, points_per_dim, idx))
        .collect()
}

/// Latin Hypercube Sampling for uniform space-filling coverage.
fn sample_lhs<R: Rng>(space: &SearchSpace, n_samples: usize, rng: &mut R) -> Vec<ParameterPoint> {
    let ndim = space.ndim();

    // One random permutation of strata per dimension
    let strata: Vec<Vec<usize>> = (0..ndim)
        .map(|_| {
            let mut perm: Vec<usize> = (0..n_samples).collect();
            perm.shuffle(rng);
            perm
        })
        .collect();

    (0..n_samples)
        .map(|i| {
            let normalized: Vec<f64> = strata
                .iter()
                .map(|perm| {
                    let lower = perm[i] as f64 / n_samples as f64;
                    let upper = (perm[i] + 1) as f64 / n_samples as f64;
                    lower + rng.r#gen::<f64>() * (upper - lower)
                })
                .collect();

            space.decode(&normalized)
        })
        .collect()
}

/// Random uniform sampling.
fn sample_random<R: Rng>(
    space: &SearchSpace,
    n_samples: usize,
    rng: &mut R,
) -> Vec<ParameterPoint> {
    let ndim = space.ndim();

    (0..n_samples)
        .map(|_| {
            let normalized: Vec<f64> = (0..ndim).map(|_| rng.r#gen()).collect();
            space.decode(&normalized)
        })
        .collect()
}

/// Guided sampling: pick the next point based on history.
///
/// Scores random candidates by distance to the nearest explored point plus a
/// score-weighted closeness to all explored points, and returns the best.
pub fn bayesian_next_sample<R: Rng>(
    space: &SearchSpace,
    history: &[(ParameterPoint, f64)],
    rng: &mut R,
) -> ParameterPoint {
    if history.is_empty() {
        let normalized: Vec<f64> = (0..space.ndim()).map(|_| rng.r#gen()).collect();
        return space.decode(&normalized);
    }

    let best_score = history
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);

    let acquisition = |p: &ParameterPoint| {
        min_distance_to_history(space, p, history)
            + EXPLOITATION_WEIGHT * similarity_to_best(space, p, history, best_score)
    };

    sample_random(space, ACQUISITION_CANDIDATES, rng)
        .into_iter()
        .map(|p| (acquisition(&p), p))
        .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, p)| p)
        .unwrap_or_else(|| space.decode(&vec![0.5; space.ndim()]))
}

/// Minimum normalized distance from point to any point in history.
fn min_distance_to_history(
    space: &SearchSpace,
    point: &ParameterPoint,
    history: &[(ParameterPoint, f64)],
) -> f64 {
    history
        .iter()
        .map(|(h, _)| space.normalized_distance(point, h))
        .fold(f64::INFINITY, f64::min)
}

/// Similarity to high-scoring points in history.
fn similarity_to_best(
    space: &SearchSpace,
    point: &ParameterPoint,
    history: &[(ParameterPoint, f64)],
    best_score: f64,
) -> f64 {
    if best_score <= 0.0 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut weight_sum = 0.0;

    for (h, score) in history {
        let weight = (*score / best_score).max(0.0);
        let sim = 1.0 / (1.0 + space.normalized_distance(point, h));
        total += weight * sim;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        0.0
    }
}
