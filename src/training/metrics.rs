//! Trial bookkeeping: the ordered log of every evaluated configuration.
//!
//! The log is owned by whoever drives the study and is handed to each trial,
//! so there is exactly one place scores accumulate.
//!
//! ## Summary statistics
//!
//! | Field    | Meaning                                 |
//! |----------|-----------------------------------------|
//! | best     | highest score (earliest trial on ties)  |
//! | mean     | mean score across trials                |
//! | std_dev  | sample standard deviation               |
//! | median   | robust center, insensitive to outliers  |
//! | worst    | lowest score                            |

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::gridsearch::ParameterPoint;

/// One evaluated configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Zero-based trial number, in evaluation order
    pub number: usize,
    pub params: ParameterPoint,
    pub score: f64,
}

/// Ordered sequence of trials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialLog {
    trials: Vec<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trial, numbering it after the existing ones.
    pub fn record(&mut self, params: ParameterPoint, score: f64) -> &TrialRecord {
        let number = self.trials.len();
        self.trials.push(TrialRecord {
            number,
            params,
            score,
        });
        &self.trials[number]
    }

    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Scores in trial order.
    pub fn scores(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.score).collect()
    }

    /// Highest-scoring trial; the earliest one wins ties.
    pub fn best(&self) -> Option<&TrialRecord> {
        self.trials.iter().fold(None, |best, t| match best {
            Some(b) if b.score >= t.score => Some(b),
            _ => Some(t),
        })
    }

    /// (params, score) pairs, the shape search strategies consume.
    pub fn history(&self) -> Vec<(ParameterPoint, f64)> {
        self.trials
            .iter()
            .map(|t| (t.params.clone(), t.score))
            .collect()
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary::from_scores(&self.scores())
    }

    /// Serializable report: all scores, the best trial number, full trials.
    pub fn report(&self) -> TrialReport {
        TrialReport {
            values: self.scores(),
            best_id: self.best().map(|t| t.number),
            trials: self.trials.clone(),
        }
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.report())
            .context("Failed to serialize trial log")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write trial log {}", path.display()))
    }
}

/// On-disk form of a finished study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialReport {
    pub values: Vec<f64>,
    pub best_id: Option<usize>,
    pub trials: Vec<TrialRecord>,
}

/// Aggregate statistics over trial scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub n_trials: usize,
    pub best: f64,
    pub worst: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl ScoreSummary {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        Self {
            n_trials: scores.len(),
            best: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst: scores.iter().copied().fold(f64::INFINITY, f64::min),
            mean: mean(scores),
            median: median(scores),
            std_dev: std_dev(scores),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(scores: &[f64]) -> TrialLog {
        let mut log = TrialLog::new();
        for (i, &s) in scores.iter().enumerate() {
            log.record(ParameterPoint::new().with("x", i as f64), s);
        }
        log
    }

    #[test]
    fn test_record_numbers_trials() {
        let log = log_with(&[0.1, 0.2, 0.3]);
        let numbers: Vec<_> = log.trials().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
    }

    #[test]
    fn test_best_prefers_earliest_on_tie() {
        let log = log_with(&[0.3, 0.7, 0.2, 0.7]);
        assert_eq!(log.best().map(|t| t.number), Some(1));
    }

    #[test]
    fn test_best_of_empty() {
        assert!(TrialLog::new().best().is_none());
        assert_eq!(TrialLog::new().report().best_id, None);
    }

    #[test]
    fn test_summary() {
        let summary = log_with(&[0.2, 0.4, 0.6, 0.8]).summary();
        assert_eq!(summary.n_trials, 4);
        assert_eq!(summary.best, 0.8);
        assert_eq!(summary.worst, 0.2);
        assert!((summary.mean - 0.5).abs() < 1e-12);
        assert!((summary.median - 0.5).abs() < 1e-12);
        assert!(summary.std_dev > 0.0);
    }

    #[test]
    fn test_summary_single() {
        let summary = ScoreSummary::from_scores(&[0.42]);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.median, 0.42);
    }

    #[test]
    fn test_write_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trials.json");
        log_with(&[0.5, 0.9]).write_json(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let report: TrialReport = serde_json::from_str(&text).unwrap();
        assert_eq!(report.values, vec![0.5, 0.9]);
        assert_eq!(report.best_id, Some(1));
        assert_eq!(report.trials[1].params.get("x"), Some(1.0));
    }
}
