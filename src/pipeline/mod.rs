//! File pipeline: discovery, per-file detection and classification.
//!
//! A run walks the project once, then processes files one at a time in
//! discovery order. Each file is read, scanned by the detector for its
//! extension, and every match is resolved against the knowledge base and
//! classified. Failures stay confined to the file that caused them and end
//! up in the result's `errors` list; only discovery can abort a run.

mod deadline;
mod discover;
mod error;
mod types;

pub use deadline::Deadline;
pub use discover::{
    build_globset, discover, relative_path, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDE_PATTERNS,
    DEFAULT_INCLUDE_PATTERNS, IMPLICIT_EXCLUDE_PATTERNS,
};
pub use error::{FileError, PipelineError};
pub use types::{DetectedFeature, EnabledAnalyzers, ErrorRecord, FileOutcome, FileReport};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregate::{self, AnalysisResult};
use crate::baseline::{BaselineThresholds, Classifier};
use crate::compat::{CompatAdapter, KnowledgeBase};
use crate::detect::{self, FeatureKind};
use crate::resolve::resolve_feature_key;

/// Default per-file size limit (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default per-file analysis budget.
pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_millis(5000);

/// Settings for one run, already validated.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub enabled_analyzers: EnabledAnalyzers,
    pub max_file_size: u64,
    pub analysis_timeout: Duration,
    pub thresholds: BaselineThresholds,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            include_patterns: DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            enabled_analyzers: EnabledAnalyzers::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT,
            thresholds: BaselineThresholds::default(),
        }
    }
}

/// Executes the analysis pipeline over a project root.
pub struct Runner<'kb> {
    root: PathBuf,
    kb: &'kb KnowledgeBase,
    options: RunOptions,
}

impl<'kb> Runner<'kb> {
    /// Create a runner with default options.
    pub fn new<P: AsRef<Path>>(root: P, kb: &'kb KnowledgeBase) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            kb,
            options: RunOptions::default(),
        }
    }

    /// Replace the run options.
    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Discover and analyze every target file.
    pub fn run(&self) -> Result<AnalysisResult, PipelineError> {
        self.run_with_progress(|_, _| {})
    }

    /// Like [`Runner::run`], reporting `(percent, message)` after each file.
    pub fn run_with_progress<F>(&self, progress: F) -> Result<AnalysisResult, PipelineError>
    where
        F: FnMut(u8, &str),
    {
        let files = self.discover()?;
        Ok(self.analyze_files(&files, progress))
    }

    /// List target files without analyzing them.
    pub fn discover(&self) -> Result<Vec<PathBuf>, PipelineError> {
        discover(
            &self.root,
            &self.options.include_patterns,
            &self.options.exclude_patterns,
        )
    }

    /// Analyze an explicit list of files. Never fails; per-file problems
    /// are reported in the result.
    pub fn analyze_files<F>(&self, files: &[PathBuf], mut progress: F) -> AnalysisResult
    where
        F: FnMut(u8, &str),
    {
        let adapter = CompatAdapter::new(self.kb);
        let classifier = Classifier::new(self.options.thresholds);
        let mut reports = Vec::with_capacity(files.len());

        for (i, path) in files.iter().enumerate() {
            let file = relative_path(&self.root, path);
            let outcome = match self.analyze_file(path, &file, &adapter, &classifier) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!(file = %file, error = %err, "file analysis failed");
                    FileOutcome::Failed(err.to_string())
                }
            };

            let percent = ((i + 1) * 100 / files.len()) as u8;
            progress(percent, &format!("Analyzed {}", file));
            reports.push(FileReport { file, outcome });
        }

        let (hits, misses) = adapter.stats();
        tracing::debug!(hits, misses, cached = adapter.cached_len(), "compat cache");

        let result = aggregate::assemble(reports);
        tracing::info!(
            files = result.total_files,
            analyzed = result.analyzed_files,
            features = result.features.len(),
            errors = result.errors.len(),
            "analysis complete"
        );
        result
    }

    /// Read, detect, resolve and classify one file.
    fn analyze_file(
        &self,
        path: &Path,
        file: &str,
        adapter: &CompatAdapter<'_>,
        classifier: &Classifier,
    ) -> Result<FileOutcome, FileError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let Some(kind) = FeatureKind::from_extension(ext) else {
            tracing::debug!(file, "no detector for extension");
            return Ok(FileOutcome::Skipped);
        };
        if !self.options.enabled_analyzers.is_enabled(kind) {
            tracing::debug!(file, kind = %kind, "analyzer disabled");
            return Ok(FileOutcome::Skipped);
        }

        let size = std::fs::metadata(path)?.len();
        if size == 0 {
            return Ok(FileOutcome::Skipped);
        }
        if size > self.options.max_file_size {
            return Err(FileError::TooLarge {
                size,
                max: self.options.max_file_size,
            });
        }

        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| FileError::InvalidEncoding)?;

        let deadline = Deadline::after(self.options.analysis_timeout);
        deadline.check()?;

        let mut features = Vec::new();
        for candidate in detect::detector_for(kind).scan(&text) {
            deadline.check()?;
            let Some(m) = candidate else {
                continue;
            };
            let feature_key = resolve_feature_key(adapter, m.kind, &m.token, m.context.as_deref());
            let fact = adapter.resolve(&feature_key);
            features.push(DetectedFeature {
                name: m.token,
                kind: m.kind,
                line: m.line,
                column: m.column,
                file_path: file.to_string(),
                baseline_status: classifier.classify(fact.as_ref()),
                context: m.context,
                feature_key,
            });
        }

        Ok(FileOutcome::Analyzed { kind, features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineStatus;
    use tempfile::TempDir;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builtin().unwrap()
    }

    #[test]
    fn test_runner_basic() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("app.js"),
            "const p = new Promise((res)=>{ fetch('/x').then(res) })",
        )
        .unwrap();

        let kb = kb();
        let result = Runner::new(temp.path(), &kb).run().unwrap();

        assert_eq!(result.total_files, 1);
        assert_eq!(result.analyzed_files, 1);
        let names: Vec<_> = result.features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["const", "Promise", "fetch"]);
        assert!(result
            .features
            .iter()
            .all(|f| f.baseline_status == BaselineStatus::WidelyAvailable));
        assert_eq!(result.features[2].feature_key, "api.fetch");
        assert_eq!(result.features[2].file_path, "app.js");
    }

    #[test]
    fn test_unknown_css_property_is_limited() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("x.css"),
            ".x { unknown-grid-prop: 1; color: red; }",
        )
        .unwrap();

        let kb = kb();
        let result = Runner::new(temp.path(), &kb).run().unwrap();
        assert_eq!(result.features.len(), 1);
        assert_eq!(result.features[0].name, "unknown-grid-prop");
        assert_eq!(
            result.features[0].baseline_status,
            BaselineStatus::LimitedAvailability
        );
    }

    #[test]
    fn test_disabled_analyzer_skips_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.css"), ".a { gap: 1px; }").unwrap();
        std::fs::write(temp.path().join("b.js"), "fetch(u)").unwrap();

        let kb = kb();
        let options = RunOptions {
            enabled_analyzers: EnabledAnalyzers {
                css: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = Runner::new(temp.path(), &kb).options(options).run().unwrap();
        assert_eq!(result.total_files, 2);
        assert_eq!(result.analyzed_files, 1);
        assert!(result.errors.is_empty());
        assert_eq!(result.features.len(), 1);
        assert_eq!(result.features[0].kind, FeatureKind::JavaScript);
    }

    #[test]
    fn test_zero_budget_times_out() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.js"), "fetch(u)").unwrap();

        let kb = kb();
        let options = RunOptions {
            analysis_timeout: Duration::ZERO,
            ..Default::default()
        };
        let result = Runner::new(temp.path(), &kb).options(options).run().unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Analysis timeout after 0ms");
        assert!(result.features.is_empty());
    }

    #[test]
    fn test_progress_reports_each_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.css"), ".a { gap: 1px; }").unwrap();
        std::fs::write(temp.path().join("b.css"), ".b { inset: 0; }").unwrap();

        let kb = kb();
        let mut seen = Vec::new();
        Runner::new(temp.path(), &kb)
            .run_with_progress(|pct, msg| seen.push((pct, msg.to_string())))
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (50, "Analyzed a.css".to_string()),
                (100, "Analyzed b.css".to_string())
            ]
        );
    }

    #[test]
    fn test_budget_is_checked_between_rejected_candidates() {
        let temp = TempDir::new().unwrap();
        // A million selector colons: the detector drops every one of them,
        // so only a check per candidate can stop the scan.
        std::fs::write(temp.path().join("a.css"), "a:b{".repeat(1_000_000)).unwrap();

        let kb = kb();
        let options = RunOptions {
            analysis_timeout: Duration::from_millis(1),
            ..Default::default()
        };
        let result = Runner::new(temp.path(), &kb).options(options).run().unwrap();
        assert_eq!(result.analyzed_files, 0);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Analysis timeout after 1ms");
    }
}
