//! Pattern-based feature detectors.
//!
//! Each detector scans the raw text of one file and lazily yields candidate
//! feature usages with their position. Detectors are stateless unit structs
//! backed by precompiled regexes, so one instance serves every file.

mod css;
mod html;
mod javascript;
mod position;

pub use css::CssDetector;
pub use html::HtmlDetector;
pub use javascript::JavaScriptDetector;
pub use position::{LineIndex, SkipSpans};

use serde::{Deserialize, Serialize};

/// Content kind a detector handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Css,
    JavaScript,
    Html,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 3] = [
        FeatureKind::Css,
        FeatureKind::JavaScript,
        FeatureKind::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Css => "css",
            FeatureKind::JavaScript => "javascript",
            FeatureKind::Html => "html",
        }
    }

    /// File extensions routed to this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FeatureKind::Css => &["css", "scss", "sass", "less"],
            FeatureKind::JavaScript => &["js", "jsx", "ts", "tsx", "mjs", "cjs", "mts", "cts"],
            FeatureKind::Html => &["html", "htm", "vue", "svelte"],
        }
    }

    /// Determine the kind from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        FeatureKind::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One candidate usage found by a detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub token: String,
    pub kind: FeatureKind,
    /// 1-based line.
    pub line: usize,
    /// 0-based character column.
    pub column: usize,
    /// Enclosing token, e.g. `img[loading]` for an attribute.
    pub context: Option<String>,
}

/// A stateless scanner for one content kind.
pub trait Detector: Send + Sync {
    fn kind(&self) -> FeatureKind;

    /// Scan `text` from the start, yielding one item per candidate in text
    /// order. `None` marks a candidate that was examined and dropped, so
    /// callers can bound the work spent between reported matches.
    fn scan<'t>(&self, text: &'t str) -> Box<dyn Iterator<Item = Option<RawMatch>> + 't>;

    /// The reported matches only.
    fn detect<'t>(&self, text: &'t str) -> Box<dyn Iterator<Item = RawMatch> + 't> {
        Box::new(self.scan(text).flatten())
    }
}

static CSS_DETECTOR: CssDetector = CssDetector;
static JAVASCRIPT_DETECTOR: JavaScriptDetector = JavaScriptDetector;
static HTML_DETECTOR: HtmlDetector = HtmlDetector;

/// Get the detector for a content kind.
pub fn detector_for(kind: FeatureKind) -> &'static dyn Detector {
    match kind {
        FeatureKind::Css => &CSS_DETECTOR,
        FeatureKind::JavaScript => &JAVASCRIPT_DETECTOR,
        FeatureKind::Html => &HTML_DETECTOR,
    }
}

/// Get the detector for a file extension, if any handles it.
pub fn detector_for_extension(ext: &str) -> Option<&'static dyn Detector> {
    FeatureKind::from_extension(ext).map(detector_for)
}
