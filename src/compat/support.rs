//! Normalized browser-support facts.

use serde::{Deserialize, Serialize};

/// Browsers tracked by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
}

impl Browser {
    pub const ALL: [Browser; 4] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::Safari,
        Browser::Edge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::Edge => "edge",
        }
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A browser release number, compared as `major.minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse release strings as they appear in compat data.
    ///
    /// Accepts `"88"`, `"15.4"`, and ranged values such as `"≤79"`, which use
    /// the stated bound. Anything else (`"preview"`, empty) is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_start_matches('≤').trim_start_matches("<=");
        let mut parts = trimmed.split('.');
        let major = parts.next()?.trim().parse().ok()?;
        let minor = match parts.next() {
            Some(m) => m.trim().parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

/// Support state of one feature in one browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BrowserSupport {
    #[default]
    Unsupported,
    /// Shipped; `since` is `None` when the data only records `true`.
    Supported { since: Option<Version> },
    /// Shipped and later withdrawn. Never counts as support.
    Removed {
        added: Option<Version>,
        removed: Option<Version>,
    },
}

impl BrowserSupport {
    pub fn is_supported(&self) -> bool {
        matches!(self, BrowserSupport::Supported { .. })
    }

    /// Version support was added in, if supported and known.
    pub fn since(&self) -> Option<Version> {
        match self {
            BrowserSupport::Supported { since } => *since,
            _ => None,
        }
    }
}

impl std::fmt::Display for BrowserSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BrowserSupport::Unsupported => write!(f, "no"),
            BrowserSupport::Supported { since: Some(v) } => write!(f, "{}+", v),
            BrowserSupport::Supported { since: None } => write!(f, "yes"),
            BrowserSupport::Removed {
                removed: Some(v), ..
            } => write!(f, "removed in {}", v),
            BrowserSupport::Removed { removed: None, .. } => write!(f, "removed"),
        }
    }
}

/// Knowledge-base answer for one resolved identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureSupportFact {
    pub chrome: BrowserSupport,
    pub firefox: BrowserSupport,
    pub safari: BrowserSupport,
    pub edge: BrowserSupport,
}

impl FeatureSupportFact {
    pub fn support(&self, browser: Browser) -> BrowserSupport {
        match browser {
            Browser::Chrome => self.chrome,
            Browser::Firefox => self.firefox,
            Browser::Safari => self.safari,
            Browser::Edge => self.edge,
        }
    }

    pub fn set(&mut self, browser: Browser, support: BrowserSupport) {
        match browser {
            Browser::Chrome => self.chrome = support,
            Browser::Firefox => self.firefox = support,
            Browser::Safari => self.safari = support,
            Browser::Edge => self.edge = support,
        }
    }

    /// Builder used by tests and fixtures: mark `browser` as supported since `major`.
    pub fn with_version(mut self, browser: Browser, major: u32) -> Self {
        self.set(
            browser,
            BrowserSupport::Supported {
                since: Some(Version::new(major, 0)),
            },
        );
        self
    }

    /// Number of tracked browsers with any current support.
    pub fn supported_count(&self) -> usize {
        Browser::ALL
            .iter()
            .filter(|b| self.support(**b).is_supported())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!(Version::parse("88"), Some(Version::new(88, 0)));
        assert_eq!(Version::parse("15.4"), Some(Version::new(15, 4)));
        assert_eq!(Version::parse("≤79"), Some(Version::new(79, 0)));
        assert_eq!(Version::parse("preview"), None);
        assert_eq!(Version::parse(""), None);
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(14, 1) > Version::new(14, 0));
        assert!(Version::new(13, 9) < Version::new(14, 0));
        assert_eq!(Version::new(15, 4).to_string(), "15.4");
        assert_eq!(Version::new(88, 0).to_string(), "88");
    }

    #[test]
    fn test_removed_is_not_supported() {
        let removed = BrowserSupport::Removed {
            added: Some(Version::new(1, 0)),
            removed: Some(Version::new(23, 0)),
        };
        assert!(!removed.is_supported());
        assert_eq!(removed.since(), None);
    }

    #[test]
    fn test_supported_count() {
        let fact = FeatureSupportFact::default()
            .with_version(Browser::Chrome, 50)
            .with_version(Browser::Safari, 10);
        assert_eq!(fact.supported_count(), 2);
        assert_eq!(fact.firefox, BrowserSupport::Unsupported);
    }
}
