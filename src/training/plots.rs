//! Study progress visualization.
//!
//! Two modes:
//! - **Live terminal**: a score sparkline redrawn after every trial
//! - **PNG export**: the score distribution via plotters (optional feature)

use std::path::Path;

#[cfg(feature = "plotters")]
use plotters::prelude::*;

use super::metrics::TrialLog;

/// Live study progress for the terminal (written to stderr).
pub struct LiveProgress {
    scores: Vec<f64>,
    best: Option<(usize, f64)>,
}

impl LiveProgress {
    pub fn new() -> Self {
        Self {
            scores: Vec::new(),
            best: None,
        }
    }

    /// Record the score of the next trial.
    pub fn record(&mut self, score: f64) {
        let number = self.scores.len();
        self.scores.push(score);
        if self.best.is_none_or(|(_, best)| score > best) {
            self.best = Some((number, score));
        }
    }

    pub fn best(&self) -> Option<(usize, f64)> {
        self.best
    }

    /// Render sparkline from values.
    fn sparkline(values: &[f64], width: usize) -> String {
        if values.is_empty() {
            return " ".repeat(width);
        }

        let chars = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = (max - min).max(0.001);

        // Sample or pad to width
        (0..width)
            .map(|i| {
                let idx = if values.len() <= width {
                    (i < values.len()).then_some(i)
                } else {
                    Some(i * values.len() / width)
                };
                match idx {
                    Some(idx) => {
                        let normalized = (values[idx] - min) / range;
                        chars[((normalized * 7.0).round() as usize).min(7)]
                    }
                    None => ' ',
                }
            })
            .collect()
    }

    /// Redraw the progress line.
    pub fn display(&self, trial: usize, total: usize) {
        use std::io::Write;

        let mut line = format!("T{:3}/{} ", trial, total);
        if let Some(last) = self.scores.last() {
            line.push_str(&format!("score[{}]{:.4} ", Self::sparkline(&self.scores, 20), last));
        }
        if let Some((number, best)) = self.best {
            line.push_str(&format!("best #{} {:.4}", number, best));
        }

        let mut stderr = std::io::stderr();
        write!(stderr, "\x1b[2K\r{}", line).ok();
        stderr.flush().ok();
    }

    /// Print the final summary with the full sparkline.
    pub fn final_summary(&self, log: &TrialLog) {
        use owo_colors::OwoColorize;

        eprintln!("\n");
        eprintln!("{}", " STUDY COMPLETE ".bold().on_green());
        eprintln!();

        if log.is_empty() {
            eprintln!("  {}", "no trials recorded".dimmed());
            eprintln!();
            return;
        }

        let summary = log.summary();
        eprintln!(
            "  {}: {}   {}: {:.4} ± {:.4}   {}: {:.4}",
            "Trials".bold(),
            summary.n_trials,
            "Mean".bold(),
            summary.mean,
            summary.std_dev,
            "Median".bold(),
            summary.median
        );
        eprintln!(
            "  {}: {:.4} → {:.4}",
            "Range".bold(),
            summary.worst,
            summary.best
        );
        eprintln!("          [{}]", Self::sparkline(&log.scores(), 40).cyan());

        if let Some(best) = log.best() {
            eprintln!(
                "  {}: trial #{} scored {}",
                "Best".bold(),
                best.number,
                format!("{:.4}", best.score).green()
            );
            for (name, value) in best.params.iter() {
                eprintln!("      {:<44} {}", name.dimmed(), value);
            }
        }
        eprintln!();
    }
}

impl Default for LiveProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// File name of the distribution chart for one layout and graph.
///
/// The degree always carries a decimal point (`2.0`, not `2`).
pub fn distribution_plot_name(layout: &str, average_degree: f64) -> String {
    format!(
        "delaunay-triangulation_distribution_{}_average_degree={:?}.png",
        layout, average_degree
    )
}

/// Scatter every trial score in one column, best trial highlighted.
#[cfg(feature = "plotters")]
pub fn plot_score_distribution(
    log: &TrialLog,
    caption: &str,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if log.is_empty() {
        return Ok(());
    }
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(output_path, (640, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let summary = log.summary();
    let pad = ((summary.best - summary.worst) * 0.1).max(0.01);

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(-1.0..1.0, (summary.worst - pad)..(summary.best + pad))?;

    chart
        .configure_mesh()
        .y_desc("shape_based_v")
        .x_labels(3)
        .draw()?;

    chart.draw_series(
        log.trials()
            .iter()
            .map(|t| Circle::new((0.0, t.score), 4, BLUE.mix(0.5).filled())),
    )?;

    if let Some(best) = log.best() {
        chart.draw_series(std::iter::once(Circle::new(
            (0.0, best.score),
            6,
            RED.filled(),
        )))?;
    }

    root.present()?;
    tracing::info!(path = %output_path.display(), "saved distribution chart");

    Ok(())
}

/// Stub when plotters feature is disabled.
#[cfg(not(feature = "plotters"))]
pub fn plot_score_distribution(
    _log: &TrialLog,
    _caption: &str,
    _output_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Plotting requires --features plotters");
    Ok(())
}
