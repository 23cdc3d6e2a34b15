//! Baseline status classification.
//!
//! Maps a support fact to one of three tiers with a breadth/recency
//! heuristic: count the tracked browsers that support a feature, count how
//! many of those shipped it at or after a per-browser "recent" release, then
//! apply fixed rules. This approximates the industry Baseline definition; it
//! is not an authoritative computation. The cutoffs are arbitrary and kept
//! in [`BaselineThresholds`] so they can be tuned from config.

use serde::{Deserialize, Serialize};

use crate::compat::{Browser, FeatureSupportFact, Version};

/// Classification tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStatus {
    WidelyAvailable,
    NewlyAvailable,
    LimitedAvailability,
}

impl BaselineStatus {
    /// Tiers from least to most risky.
    pub const ALL: [BaselineStatus; 3] = [
        BaselineStatus::WidelyAvailable,
        BaselineStatus::NewlyAvailable,
        BaselineStatus::LimitedAvailability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineStatus::WidelyAvailable => "widely_available",
            BaselineStatus::NewlyAvailable => "newly_available",
            BaselineStatus::LimitedAvailability => "limited_availability",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BaselineStatus::WidelyAvailable => "Widely available",
            BaselineStatus::NewlyAvailable => "Newly available",
            BaselineStatus::LimitedAvailability => "Limited availability",
        }
    }

    /// Fixed 1:1 relabeling into a risk level.
    pub fn risk(&self) -> RiskLevel {
        match self {
            BaselineStatus::WidelyAvailable => RiskLevel::Low,
            BaselineStatus::NewlyAvailable => RiskLevel::Medium,
            BaselineStatus::LimitedAvailability => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for BaselineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Risk of shipping a feature without a fallback. Ordered low < high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First release per browser that counts as "recent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecencyThresholds {
    pub chrome: u32,
    pub firefox: u32,
    pub safari: u32,
    pub edge: u32,
}

impl Default for RecencyThresholds {
    fn default() -> Self {
        Self {
            chrome: 88,
            firefox: 85,
            safari: 14,
            edge: 88,
        }
    }
}

impl RecencyThresholds {
    pub fn for_browser(&self, browser: Browser) -> Version {
        let major = match browser {
            Browser::Chrome => self.chrome,
            Browser::Firefox => self.firefox,
            Browser::Safari => self.safari,
            Browser::Edge => self.edge,
        };
        Version::new(major, 0)
    }
}

/// Tunable classification constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineThresholds {
    pub recency: RecencyThresholds,
    /// Browsers required for `widely_available` (with none recent).
    pub widely_min_supported: usize,
    /// Browsers required for `newly_available`.
    pub newly_min_supported: usize,
    /// Most recent-support browsers still allowed for `newly_available`.
    pub newly_max_recent: usize,
}

impl Default for BaselineThresholds {
    fn default() -> Self {
        Self {
            recency: RecencyThresholds::default(),
            widely_min_supported: 4,
            newly_min_supported: 3,
            newly_max_recent: 2,
        }
    }
}

/// Breadth and recency counts for one fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportCounts {
    pub supported: usize,
    pub recent: usize,
}

/// Applies [`BaselineThresholds`] to support facts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    thresholds: BaselineThresholds,
}

impl Classifier {
    pub fn new(thresholds: BaselineThresholds) -> Self {
        Self { thresholds }
    }

    /// Count supporting browsers and those whose support is recent.
    ///
    /// Support recorded without a version is old, not recent.
    pub fn counts(&self, fact: &FeatureSupportFact) -> SupportCounts {
        let mut counts = SupportCounts {
            supported: 0,
            recent: 0,
        };
        for browser in Browser::ALL {
            let support = fact.support(browser);
            if !support.is_supported() {
                continue;
            }
            counts.supported += 1;
            if let Some(since) = support.since() {
                if since >= self.thresholds.recency.for_browser(browser) {
                    counts.recent += 1;
                }
            }
        }
        counts
    }

    /// Classify a fact; a missing fact is `limited_availability`.
    pub fn classify(&self, fact: Option<&FeatureSupportFact>) -> BaselineStatus {
        let Some(fact) = fact else {
            return BaselineStatus::LimitedAvailability;
        };
        let SupportCounts { supported, recent } = self.counts(fact);
        let t = &self.thresholds;

        if supported >= t.widely_min_supported && recent == 0 {
            BaselineStatus::WidelyAvailable
        } else if supported >= t.newly_min_supported && recent <= t.newly_max_recent {
            BaselineStatus::NewlyAvailable
        } else {
            BaselineStatus::LimitedAvailability
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(fact: Option<&FeatureSupportFact>) -> BaselineStatus {
    Classifier::default().classify(fact)
}
