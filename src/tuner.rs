//! Run controller: ties a layout session, the scorer, and a study together.
//!
//! One trial is:
//!
//! ```text
//! ParameterPoint → family properties → engine layout → positions
//!                → Delaunay graph → Jaccard vs. input graph → score
//! ```
//!
//! The controller owns the [`TrialLog`]; the study only reads it to decide
//! what to try next.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::engine::{LayoutEngine, LayoutSession};
use crate::graph::Graph;
use crate::layouts::LayoutFamily;
use crate::scoring::layout_score;
use crate::training::{LiveProgress, ParameterPoint, Study, TrialLog};
use crate::types::Point;

/// Tunes one layout family on one graph.
pub struct Tuner<'g, 'e, E: LayoutEngine> {
    graph: &'g Graph,
    family: LayoutFamily,
    session: LayoutSession<'e, E>,
    log: TrialLog,
}

impl<'g, 'e, E: LayoutEngine> Tuner<'g, 'e, E> {
    /// `session` must have been opened on `graph`.
    pub fn new(graph: &'g Graph, family: LayoutFamily, session: LayoutSession<'e, E>) -> Self {
        Self {
            graph,
            family,
            session,
            log: TrialLog::new(),
        }
    }

    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    pub fn into_log(self) -> TrialLog {
        self.log
    }

    /// Score one configuration without recording it.
    pub fn evaluate(&mut self, point: &ParameterPoint) -> Result<f64> {
        trial_score(&mut self.session, self.graph, self.family, point)
    }

    /// Spend `n_trials` on `study`, appending every trial to the log.
    ///
    /// Stops at the first failing trial; earlier trials stay in the log.
    pub fn run(
        &mut self,
        study: &mut Study,
        n_trials: usize,
        mut progress: Option<&mut LiveProgress>,
    ) -> Result<&TrialLog> {
        let graph = self.graph;
        let family = self.family;
        let session = &mut self.session;
        let mut trial = 0;

        tracing::info!(
            family = %family,
            strategy = %study.strategy(),
            n_trials,
            knobs = study.space().ndim(),
            "starting study"
        );

        study.optimize(n_trials, &mut self.log, |point| {
            trial += 1;
            let score = trial_score(session, graph, family, point)
                .with_context(|| format!("Trial {} failed", trial - 1))?;
            if let Some(progress) = progress.as_deref_mut() {
                progress.record(score);
                progress.display(trial, n_trials);
            }
            Ok(score)
        })?;

        Ok(&self.log)
    }
}

/// Lay out `graph` with `point`'s knobs and score the result.
fn trial_score<E: LayoutEngine>(
    session: &mut LayoutSession<'_, E>,
    graph: &Graph,
    family: LayoutFamily,
    point: &ParameterPoint,
) -> Result<f64> {
    let properties = family.properties(point);
    let positions = session.run_layout(family, &properties)?;
    let score = layout_score(graph, &positions)?;
    tracing::debug!(score, "layout scored");
    Ok(score)
}

/// Score fixed coordinates against `graph` without an engine.
pub fn score_positions(graph: &Graph, positions: &[Point]) -> Result<f64> {
    layout_score(graph, positions).context("Failed to score positions")
}

/// Coordinates as stored on disk: `[[x, y], ...]` in graph node order, or
/// `{"node": [x, y], ...}` keyed by node identifier.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PositionsFile {
    Ordered(Vec<(f64, f64)>),
    ByNode(HashMap<String, (f64, f64)>),
}

/// Load a coordinate file and align it with `graph`'s node order.
pub fn load_positions(path: &Path, graph: &Graph) -> Result<Vec<Point>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read positions file {}", path.display()))?;
    parse_positions(&text, graph)
        .with_context(|| format!("Invalid positions file {}", path.display()))
}

fn parse_positions(text: &str, graph: &Graph) -> Result<Vec<Point>> {
    let file: PositionsFile =
        serde_json::from_str(text).context("Expected [[x, y], ...] or {\"node\": [x, y]}")?;

    match file {
        PositionsFile::Ordered(pairs) => {
            if pairs.len() != graph.node_count() {
                bail!(
                    "{} positions for {} nodes",
                    pairs.len(),
                    graph.node_count()
                );
            }
            Ok(pairs.into_iter().map(Point::from).collect())
        }
        PositionsFile::ByNode(by_node) => graph
            .nodes()
            .map(|id| {
                by_node
                    .get(id.as_str())
                    .map(|&pair| Point::from(pair))
                    .with_context(|| format!("No position for node '{}'", id))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use crate::training::SearchStrategy;
    use crate::types::{NodeId, StyleDefaults};

    /// Ring of `n` nodes.
    fn ring(n: usize) -> Graph {
        let mut g = Graph::with_nodes((0..n).map(NodeId::from));
        for i in 0..n {
            g.add_edge(i, (i + 1) % n, 1.0);
        }
        g
    }

    #[test]
    fn test_full_trial_loop_against_mock_engine() {
        let graph = ring(8);
        let family = LayoutFamily::FruchtermanRheingold;
        let mut engine = MockEngine::new();

        let log = {
            let session =
                LayoutSession::open(&mut engine, &graph, "ring", &StyleDefaults::default())
                    .unwrap();
            let mut tuner = Tuner::new(&graph, family, session);
            let mut study = Study::new(family.search_space(), SearchStrategy::Bayesian, 1);
            let mut progress = LiveProgress::new();
            tuner.run(&mut study, 12, Some(&mut progress)).unwrap();
            assert_eq!(progress.best().map(|(n, _)| n), tuner.log().best().map(|t| t.number));
            tuner.into_log()
        };

        assert_eq!(log.len(), 12);
        assert!(log.scores().iter().all(|s| (0.0..=1.0).contains(s)));
        let best = log.best().unwrap();
        assert!(log.scores().iter().all(|&s| s <= best.score));

        // Session opened once, then one configure/apply/read round per trial
        assert_eq!(engine.calls()[..3], ["clear", "create_network ring", "apply_style"]);
        let applies = engine
            .calls()
            .iter()
            .filter(|c| c.starts_with("apply_layout"))
            .count();
        assert_eq!(applies, 12);

        // Last configured properties: tuned knobs plus the fixed ones
        let sent = engine.properties(family).unwrap();
        assert!(sent.iter().any(|p| p.name == "nIterations"));
        assert!(sent.iter().any(|p| p.name == "temperature"));
    }

    #[test]
    fn test_trials_are_reproducible() {
        let graph = ring(6);
        let family = LayoutFamily::KamadaKawai;
        let run = || {
            let mut engine = MockEngine::new();
            let session =
                LayoutSession::open(&mut engine, &graph, "ring", &StyleDefaults::default())
                    .unwrap();
            let mut tuner = Tuner::new(&graph, family, session);
            let mut study = Study::new(family.search_space(), SearchStrategy::Random, 7);
            tuner.run(&mut study, 5, None).unwrap();
            tuner.into_log().scores()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_geometry_error_aborts_run() {
        let graph = ring(4);
        // All nodes on a line: no triangle
        let collinear = (0..4).map(|i| Point::new(i as f64, 0.0)).collect();
        let mut engine = MockEngine::with_positions(collinear);
        let session =
            LayoutSession::open(&mut engine, &graph, "ring", &StyleDefaults::default()).unwrap();
        let mut tuner = Tuner::new(&graph, LayoutFamily::default(), session);
        let mut study = Study::new(
            LayoutFamily::default().search_space(),
            SearchStrategy::Random,
            1,
        );

        let err = tuner.run(&mut study, 3, None).unwrap_err();
        assert!(format!("{:#}", err).contains("Trial 0 failed"));
        assert!(tuner.log().is_empty());
    }

    #[test]
    fn test_evaluate_does_not_record() {
        let graph = ring(5);
        let family = LayoutFamily::default();
        let mut engine = MockEngine::new();
        let session =
            LayoutSession::open(&mut engine, &graph, "ring", &StyleDefaults::default()).unwrap();
        let mut tuner = Tuner::new(&graph, family, session);
        let point = family.search_space().decode(&[0.5; 7]);
        let score = tuner.evaluate(&point).unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!(tuner.log().is_empty());
    }

    #[test]
    fn test_parse_positions_ordered() {
        let graph = ring(3);
        let points = parse_positions("[[0, 0], [1, 0], [0, 1]]", &graph).unwrap();
        assert_eq!(points[2], Point::new(0.0, 1.0));
        assert_eq!(score_positions(&graph, &points).unwrap(), 1.0);
    }

    #[test]
    fn test_parse_positions_by_node() {
        let graph = ring(3);
        let points =
            parse_positions(r#"{"2": [0, 1], "0": [0, 0], "1": [1, 0]}"#, &graph).unwrap();
        assert_eq!(points, vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)]);
    }

    #[test]
    fn test_parse_positions_errors() {
        let graph = ring(3);
        assert!(parse_positions("[[0, 0], [1, 0]]", &graph).is_err());
        assert!(parse_positions(r#"{"0": [0, 0]}"#, &graph).is_err());
        assert!(parse_positions(r#""nope""#, &graph).is_err());
    }

    #[test]
    fn test_load_positions_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.json");
        std::fs::write(&path, "[[0, 0], [2, 0], [1, 2]]").unwrap();
        assert_eq!(load_positions(&path, &ring(3)).unwrap().len(), 3);
        assert!(load_positions(&dir.path().join("missing.json"), &ring(3)).is_err());
    }
}
