//! Per-file pipeline records.

use serde::{Deserialize, Serialize};

use crate::baseline::BaselineStatus;
use crate::detect::FeatureKind;

/// One occurrence of a candidate feature in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFeature {
    /// Raw token as written in the source.
    pub name: String,
    pub kind: FeatureKind,
    /// 1-based line of the token's first character.
    pub line: usize,
    /// 0-based character column of the token's first character.
    pub column: usize,
    pub file_path: String,
    pub baseline_status: BaselineStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Knowledge-base key the token resolved to (or the best guess).
    pub feature_key: String,
}

/// A file that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub file: String,
    pub message: String,
}

/// What happened to one discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Scanned by the detector for `kind`.
    Analyzed {
        kind: FeatureKind,
        features: Vec<DetectedFeature>,
    },
    /// Empty, no detector for the extension, or analyzer disabled.
    Skipped,
    /// Reading or analysis failed with this message.
    Failed(String),
}

/// Outcome of one file, keyed by its display path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: String,
    pub outcome: FileOutcome,
}

/// Which detectors may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnabledAnalyzers {
    pub css: bool,
    pub javascript: bool,
    pub html: bool,
}

impl Default for EnabledAnalyzers {
    fn default() -> Self {
        Self {
            css: true,
            javascript: true,
            html: true,
        }
    }
}

impl EnabledAnalyzers {
    pub fn is_enabled(&self, kind: FeatureKind) -> bool {
        match kind {
            FeatureKind::Css => self.css,
            FeatureKind::JavaScript => self.javascript,
            FeatureKind::Html => self.html,
        }
    }
}
