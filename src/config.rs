//! Configuration loading from layoutfit.toml.
//!
//! Every key is optional; command-line flags override whatever the file
//! sets, and the file overrides the built-in defaults.
//!
//! ## Example
//!
//! ```toml
//! [engine]
//! url = "http://localhost:1234/v1"
//! timeout-secs = 300
//! title = "coauthors"
//!
//! [study]
//! layout = "kamada-kawai"
//! trials = 100
//! seed = 1
//! strategy = "bayesian"
//!
//! [style]
//! node-shape = "ELLIPSE"
//! node-size = 15
//! font-size = 10
//!
//! [output]
//! dir = "images"
//! results = "images/trials.json"
//! plot = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::DEFAULT_URL;
use crate::layouts::LayoutFamily;
use crate::training::SearchStrategy;
use crate::types::StyleDefaults;

/// Config file name searched for in the working directory and its parents.
pub const CONFIG_FILE: &str = "layoutfit.toml";

pub const DEFAULT_TRIALS: usize = 100;
pub const DEFAULT_SEED: u64 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_OUTPUT_DIR: &str = "images";

/// Layoutfit configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source file for this config (for display).
    pub source: Option<PathBuf>,

    /// CyREST root URL.
    pub engine_url: String,

    /// Per-request timeout for engine calls.
    pub timeout: Duration,

    /// Network title in the engine; the graph file stem when unset.
    pub title: Option<String>,

    pub layout: LayoutFamily,
    pub trials: usize,
    pub seed: u64,
    pub strategy: SearchStrategy,
    pub style: StyleDefaults,

    /// Directory the distribution chart is written to.
    pub output_dir: PathBuf,

    /// Trial log path; `<output_dir>/trials_<layout>.json` when unset.
    pub results: Option<PathBuf>,

    /// Whether to render the distribution chart.
    pub plot: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            engine_url: DEFAULT_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            title: None,
            layout: LayoutFamily::default(),
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            strategy: SearchStrategy::default(),
            style: StyleDefaults::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            results: None,
            plot: true,
        }
    }
}

/// Raw config as deserialized from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    engine: RawEngine,
    study: RawStudy,
    style: Option<StyleDefaults>,
    output: RawOutput,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
struct RawEngine {
    url: Option<String>,
    timeout_secs: Option<u64>,
    title: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
struct RawStudy {
    layout: Option<LayoutFamily>,
    trials: Option<usize>,
    seed: Option<u64>,
    strategy: Option<SearchStrategy>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
struct RawOutput {
    dir: Option<PathBuf>,
    results: Option<PathBuf>,
    plot: Option<bool>,
}

impl Config {
    /// Load configuration for the given directory.
    ///
    /// Search order:
    /// 1. layoutfit.toml in directory
    /// 2. Walk up to find layoutfit.toml
    /// 3. Default config if nothing found
    ///
    /// A file that fails to parse is skipped with a warning.
    pub fn load(directory: &Path) -> Self {
        for dir in directory.ancestors() {
            let candidate = dir.join(CONFIG_FILE);
            if !candidate.is_file() {
                continue;
            }
            match Self::load_file(&candidate) {
                Ok(config) => return config,
                Err(err) => {
                    tracing::warn!(path = %candidate.display(), "ignoring config: {:#}", err);
                }
            }
        }
        Self::default()
    }

    /// Load an explicit config file; any problem is an error.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(Self::from_raw(raw, path.to_path_buf()))
    }

    fn from_raw(raw: RawConfig, source: PathBuf) -> Self {
        let defaults = Self::default();
        Self {
            source: Some(source),
            engine_url: raw.engine.url.unwrap_or(defaults.engine_url),
            timeout: raw
                .engine
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            title: raw.engine.title,
            layout: raw.study.layout.unwrap_or(defaults.layout),
            trials: raw.study.trials.unwrap_or(defaults.trials),
            seed: raw.study.seed.unwrap_or(defaults.seed),
            strategy: raw.study.strategy.unwrap_or(defaults.strategy),
            style: raw.style.unwrap_or(defaults.style),
            output_dir: raw.output.dir.unwrap_or(defaults.output_dir),
            results: raw.output.results,
            plot: raw.output.plot.unwrap_or(defaults.plot),
        }
    }

    /// Trial log path, defaulting into the output directory.
    pub fn results_path(&self) -> PathBuf {
        self.results.clone().unwrap_or_else(|| {
            self.output_dir
                .join(format!("trials_{}.json", self.layout.engine_name()))
        })
    }

    /// Format config for verbose display.
    pub fn display_summary(&self) -> String {
        let mut lines = Vec::new();

        if let Some(ref source) = self.source {
            lines.push(format!("   Config: {}", source.display()));
        } else {
            lines.push("   Config: (defaults)".to_string());
        }

        lines.push(format!(
            "   Engine: {} (timeout {}s)",
            self.engine_url,
            self.timeout.as_secs()
        ));
        lines.push(format!(
            "   Study: {} × {} trials, {} strategy, seed {}",
            self.layout, self.trials, self.strategy, self.seed
        ));
        lines.push(format!(
            "   Style: {} size {} font {}",
            self.style.node_shape, self.style.node_size, self.style.font_size
        ));
        lines.push(format!("   Results: {}", self.results_path().display()));
        if self.plot {
            lines.push(format!("   Charts: {}", self.output_dir.display()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine_url, "http://localhost:1234/v1");
        assert_eq!(config.trials, 100);
        assert_eq!(config.seed, 1);
        assert_eq!(config.layout, LayoutFamily::FruchtermanRheingold);
        assert_eq!(config.strategy, SearchStrategy::Bayesian);
        assert_eq!(
            config.results_path(),
            Path::new("images/trials_fruchterman-rheingold.json")
        );
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
[engine]
url = "http://cytoscape:1234/v1"
timeout-secs = 30

[study]
layout = "kamada-kawai"
trials = 20
seed = 9
strategy = "grid:3"

[style]
node-size = 20

[output]
dir = "out"
plot = false
"#,
        )
        .unwrap();

        let config = Config::load(dir.path());
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE)));
        assert_eq!(config.engine_url, "http://cytoscape:1234/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.layout, LayoutFamily::KamadaKawai);
        assert_eq!(config.trials, 20);
        assert_eq!(config.seed, 9);
        assert_eq!(config.strategy, SearchStrategy::Grid { points_per_dim: 3 });
        assert_eq!(config.style.node_size, 20.0);
        assert_eq!(config.style.node_shape, "ELLIPSE");
        assert!(!config.plot);
        assert_eq!(config.results_path(), Path::new("out/trials_kamada-kawai.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[study]\ntrials = 5\n").unwrap();
        let config = Config::load(dir.path());
        assert_eq!(config.trials, 5);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.engine_url, DEFAULT_URL);
        assert!(config.plot);
    }

    #[test]
    fn test_walks_up_to_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[study]\nseed = 42\n").unwrap();
        assert_eq!(Config::load(&nested).seed, 42);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path());
        assert!(config.source.is_none());
        assert_eq!(config.trials, DEFAULT_TRIALS);
    }

    #[test]
    fn test_load_file_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[study]\nstrategy = \"annealing\"\n").unwrap();
        let err = Config::load_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown search strategy"));

        std::fs::write(&path, "[nonsense]\nx = 1\n").unwrap();
        assert!(Config::load_file(&path).is_err());

        assert!(Config::load_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_display_summary() {
        let summary = Config::default().display_summary();
        assert!(summary.contains("(defaults)"));
        assert!(summary.contains("fruchterman-rheingold × 100 trials"));
    }
}
