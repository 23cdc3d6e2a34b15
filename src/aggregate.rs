//! Aggregation of per-file results into the run report.
//!
//! [`assemble`] never fails: whatever the per-file outcomes were, the result
//! is complete, with failed files listed under `errors`. The summary, the
//! risk distribution and the per-kind breakdown are all plain occurrence
//! counts over `features`, so each of them sums to `features.len()`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::baseline::{BaselineStatus, RiskLevel};
use crate::detect::FeatureKind;
use crate::pipeline::{DetectedFeature, ErrorRecord, FileOutcome, FileReport};

/// Occurrences per baseline status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub widely_available: usize,
    pub newly_available: usize,
    pub limited_availability: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.widely_available + self.newly_available + self.limited_availability
    }

    pub fn get(&self, status: BaselineStatus) -> usize {
        match status {
            BaselineStatus::WidelyAvailable => self.widely_available,
            BaselineStatus::NewlyAvailable => self.newly_available,
            BaselineStatus::LimitedAvailability => self.limited_availability,
        }
    }

    fn add(&mut self, status: BaselineStatus) {
        match status {
            BaselineStatus::WidelyAvailable => self.widely_available += 1,
            BaselineStatus::NewlyAvailable => self.newly_available += 1,
            BaselineStatus::LimitedAvailability => self.limited_availability += 1,
        }
    }
}

/// The summary relabeled as risk: widely → low, newly → medium,
/// limited → high.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskDistribution {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

impl From<Summary> for RiskDistribution {
    fn from(s: Summary) -> Self {
        Self {
            low: s.widely_available,
            medium: s.newly_available,
            high: s.limited_availability,
        }
    }
}

/// Occurrences per detector kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeBreakdown {
    pub css: usize,
    pub javascript: usize,
    pub html: usize,
}

impl FileTypeBreakdown {
    pub fn get(&self, kind: FeatureKind) -> usize {
        match kind {
            FeatureKind::Css => self.css,
            FeatureKind::JavaScript => self.javascript,
            FeatureKind::Html => self.html,
        }
    }

    fn add(&mut self, kind: FeatureKind) {
        match kind {
            FeatureKind::Css => self.css += 1,
            FeatureKind::JavaScript => self.javascript += 1,
            FeatureKind::Html => self.html += 1,
        }
    }
}

/// Complete outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub total_files: usize,
    pub analyzed_files: usize,
    pub features: Vec<DetectedFeature>,
    pub errors: Vec<ErrorRecord>,
    pub summary: Summary,
    pub risk_distribution: RiskDistribution,
    pub file_type_breakdown: FileTypeBreakdown,
}

/// Merge per-file reports, in order, into one result.
pub fn assemble(reports: Vec<FileReport>) -> AnalysisResult {
    let mut result = AnalysisResult {
        total_files: reports.len(),
        ..Default::default()
    };

    for report in reports {
        match report.outcome {
            FileOutcome::Analyzed { features, .. } => {
                result.analyzed_files += 1;
                result.features.extend(features);
            }
            FileOutcome::Skipped => {}
            FileOutcome::Failed(message) => result.errors.push(ErrorRecord {
                file: report.file,
                message,
            }),
        }
    }

    for feature in &result.features {
        result.summary.add(feature.baseline_status);
        result.file_type_breakdown.add(feature.kind);
    }
    result.risk_distribution = result.summary.into();
    result
}

/// Where one usage occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

/// All occurrences of one feature, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureUsage {
    pub feature_key: String,
    /// Token of the first occurrence.
    pub name: String,
    pub kind: FeatureKind,
    pub baseline_status: BaselineStatus,
    pub risk: RiskLevel,
    pub count: usize,
    pub locations: Vec<Location>,
}

impl AnalysisResult {
    /// Group features by `(feature_key, kind)`.
    ///
    /// Groups are ordered by risk (high first), then by usage count, with
    /// ties kept in first-seen order.
    pub fn usages(&self) -> Vec<FeatureUsage> {
        let mut index: HashMap<(&str, FeatureKind), usize> = HashMap::new();
        let mut groups: Vec<FeatureUsage> = Vec::new();

        for f in &self.features {
            let location = Location {
                file: f.file_path.clone(),
                line: f.line,
                column: f.column,
            };
            match index.get(&(f.feature_key.as_str(), f.kind)) {
                Some(&i) => {
                    groups[i].count += 1;
                    groups[i].locations.push(location);
                }
                None => {
                    index.insert((f.feature_key.as_str(), f.kind), groups.len());
                    groups.push(FeatureUsage {
                        feature_key: f.feature_key.clone(),
                        name: f.name.clone(),
                        kind: f.kind,
                        baseline_status: f.baseline_status,
                        risk: f.baseline_status.risk(),
                        count: 1,
                        locations: vec![location],
                    });
                }
            }
        }

        groups.sort_by(|a, b| b.risk.cmp(&a.risk).then(b.count.cmp(&a.count)));
        groups
    }

    /// Share of features that are widely available, 0-100 rounded down.
    /// A run without features scores 100.
    pub fn support_score(&self) -> u8 {
        let total = self.features.len();
        if total == 0 {
            return 100;
        }
        (self.summary.widely_available * 100 / total) as u8
    }

    /// Whether any feature reaches `level`.
    pub fn fails_at(&self, level: FailOn) -> bool {
        let risk = &self.risk_distribution;
        match level {
            FailOn::High => risk.high > 0,
            FailOn::Medium => risk.medium > 0 || risk.high > 0,
            FailOn::Low => !self.features.is_empty(),
        }
    }
}

/// Minimum risk tier that fails a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailOn {
    #[default]
    High,
    Medium,
    Low,
}

impl FailOn {
    pub const NAMES: [&'static str; 3] = ["high", "medium", "low"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FailOn::High => "high",
            FailOn::Medium => "medium",
            FailOn::Low => "low",
        }
    }
}

impl fmt::Display for FailOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailOn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(FailOn::High),
            "medium" => Ok(FailOn::Medium),
            "low" => Ok(FailOn::Low),
            other => Err(format!(
                "unknown fail-on level {:?} (expected one of: {})",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

/// Build-failure decision for a textual level. Unknown levels never fail.
pub fn should_fail(result: &AnalysisResult, fail_on: &str) -> bool {
    match fail_on.parse::<FailOn>() {
        Ok(level) => result.fails_at(level),
        Err(_) => false,
    }
}
