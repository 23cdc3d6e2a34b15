//! baselinecheck - web platform baseline compatibility checker.
//!
//! Scans CSS, JavaScript and HTML sources for web platform features,
//! classifies every usage by how broadly browsers support it, and turns the
//! result into a report that can gate a build.
//!
//! # Architecture
//!
//! Data flows strictly forward through the pipeline:
//!
//! - `pipeline`: file discovery, size and timeout limits, per-file error isolation
//! - `detect`: pattern-based detectors for CSS, JavaScript and HTML
//! - `resolve`: maps raw tokens to knowledge-base keys
//! - `compat`: the compatibility knowledge base and its per-run cache
//! - `baseline`: three-tier classification of support facts
//! - `aggregate`: summary counts, usage groups and the fail decision
//! - `config`: YAML config schema
//! - `report`: output formatting (pretty, JSON, Markdown)
//!
//! # Example
//!
//! ```no_run
//! use baselinecheck::{KnowledgeBase, Runner};
//!
//! let kb = KnowledgeBase::builtin()?;
//! let result = Runner::new("src", &kb).run()?;
//! println!("{} features, {} high risk", result.features.len(), result.risk_distribution.high);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod baseline;
pub mod cli;
pub mod compat;
pub mod config;
pub mod detect;
pub mod pipeline;
pub mod report;
pub mod resolve;

pub use aggregate::{should_fail, AnalysisResult, FailOn, FeatureUsage};
pub use baseline::{classify, BaselineStatus, BaselineThresholds, Classifier, RiskLevel};
pub use compat::{CompatAdapter, FeatureSupportFact, KnowledgeBase};
pub use config::Config;
pub use detect::{Detector, FeatureKind, RawMatch};
pub use pipeline::{DetectedFeature, FileError, PipelineError, RunOptions, Runner};
pub use resolve::resolve_feature_key;
