//! Configuration file schema for baselinecheck.
//!
//! A config file tunes discovery, per-file limits, the build gate and the
//! classification thresholds. Every field is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aggregate::FailOn;
use crate::baseline::BaselineThresholds;
use crate::compat::KnowledgeBase;
use crate::pipeline::{
    EnabledAnalyzers, RunOptions, DEFAULT_ANALYSIS_TIMEOUT, DEFAULT_EXCLUDE_PATTERNS,
    DEFAULT_INCLUDE_PATTERNS, DEFAULT_MAX_FILE_SIZE,
};

/// File names tried, in order, when no config path is given.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "baselinecheck.yaml",
    ".baselinecheck.yaml",
    "baseline.yaml",
];

/// Smallest accepted `max_file_size`.
pub const MIN_MAX_FILE_SIZE: u64 = 1024;

/// Smallest accepted `analysis_timeout`, in milliseconds.
pub const MIN_ANALYSIS_TIMEOUT_MS: u64 = 1000;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Informational target for the support score (0-100).
    pub support_threshold: u32,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub enabled_analyzers: EnabledAnalyzers,
    /// Bytes.
    pub max_file_size: u64,
    /// Milliseconds.
    pub analysis_timeout: u64,
    /// "high", "medium" or "low".
    pub fail_on: String,
    /// Extra knowledge-base documents, layered over the built-in snapshot.
    pub compat_data: Vec<PathBuf>,
    pub baseline_thresholds: BaselineThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            support_threshold: 90,
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
            analysis_timeout: DEFAULT_ANALYSIS_TIMEOUT.as_millis() as u64,
            fail_on: FailOn::default().to_string(),
            compat_data: Vec::new(),
            baseline_thresholds: BaselineThresholds::default(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    ///
    /// Relative `compat_data` paths are resolved against the file's directory.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        let mut config = Self::parse_str(&content)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {}", path.display(), e))?;

        if let Some(dir) = path.parent() {
            for data in &mut config.compat_data {
                if data.is_relative() {
                    *data = dir.join(&*data);
                }
            }
        }
        Ok(config)
    }

    /// Parse a config from YAML text. An empty document yields the defaults.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Find a config file in `dir` by the conventional names.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    /// Load the explicit file if given, else a discovered one, else defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover(dir),
        };
        match path {
            Some(p) => {
                tracing::debug!(config = %p.display(), "loading config");
                Ok((Self::parse_file(&p)?, Some(p)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Parsed `fail_on`. Call [`validate`] first.
    pub fn fail_on_level(&self) -> anyhow::Result<FailOn> {
        self.fail_on.parse::<FailOn>().map_err(anyhow::Error::msg)
    }

    /// Pipeline options derived from this config.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            enabled_analyzers: self.enabled_analyzers,
            max_file_size: self.max_file_size,
            analysis_timeout: Duration::from_millis(self.analysis_timeout),
            thresholds: self.baseline_thresholds,
        }
    }

    /// The built-in knowledge base with `compat_data` files layered on.
    pub fn knowledge_base(&self) -> anyhow::Result<KnowledgeBase> {
        let mut kb = KnowledgeBase::builtin()?;
        for path in &self.compat_data {
            kb.merge_file(path)?;
        }
        tracing::debug!(features = kb.feature_count(), "knowledge base loaded");
        Ok(kb)
    }
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.support_threshold > 100 {
        anyhow::bail!(
            "support_threshold must be between 0 and 100, got {}",
            config.support_threshold
        );
    }
    if config.max_file_size < MIN_MAX_FILE_SIZE {
        anyhow::bail!(
            "max_file_size must be at least {} bytes, got {}",
            MIN_MAX_FILE_SIZE,
            config.max_file_size
        );
    }
    if config.analysis_timeout < MIN_ANALYSIS_TIMEOUT_MS {
        anyhow::bail!(
            "analysis_timeout must be at least {}ms, got {}",
            MIN_ANALYSIS_TIMEOUT_MS,
            config.analysis_timeout
        );
    }
    config.fail_on_level()?;

    if config.include_patterns.is_empty() {
        anyhow::bail!("include_patterns must not be empty");
    }
    for pattern in config
        .include_patterns
        .iter()
        .chain(config.exclude_patterns.iter())
    {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid glob pattern {:?}: {}", pattern, e))?;
    }

    let t = &config.baseline_thresholds;
    if t.widely_min_supported > 4 || t.newly_min_supported > 4 {
        anyhow::bail!("baseline_thresholds: browser counts cannot exceed 4");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
support_threshold: 80
include_patterns:
  - "src/**/*.css"
exclude_patterns:
  - "**/legacy/**"
enabled_analyzers:
  html: false
max_file_size: 2048
analysis_timeout: 1500
fail_on: medium
baseline_thresholds:
  recency:
    safari: 15
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.support_threshold, 80);
        assert_eq!(config.include_patterns, vec!["src/**/*.css"]);
        assert!(config.enabled_analyzers.css);
        assert!(!config.enabled_analyzers.html);
        assert_eq!(config.fail_on_level().unwrap(), FailOn::Medium);
        assert_eq!(config.baseline_thresholds.recency.safari, 15);
        assert_eq!(config.baseline_thresholds.recency.chrome, 88);
        assert!(validate(&config).is_ok());

        let options = config.run_options();
        assert_eq!(options.max_file_size, 2048);
        assert_eq!(options.analysis_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.support_threshold, 90);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.analysis_timeout, 5000);
        assert_eq!(config.fail_on, "high");
        assert_eq!(config.exclude_patterns, vec!["**/*.min.js", "**/*.min.css"]);
        assert!(validate(&config).is_ok());

        // An explicit list replaces the minified-bundle default
        let config = Config::parse_str("exclude_patterns: []").unwrap();
        assert!(config.exclude_patterns.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            Config {
                support_threshold: 101,
                ..Default::default()
            },
            Config {
                max_file_size: 1023,
                ..Default::default()
            },
            Config {
                analysis_timeout: 999,
                ..Default::default()
            },
            Config {
                fail_on: "critical".to_string(),
                ..Default::default()
            },
            Config {
                include_patterns: Vec::new(),
                ..Default::default()
            },
            Config {
                exclude_patterns: vec!["src/[".to_string()],
                ..Default::default()
            },
        ];
        for config in &bad {
            assert!(validate(config).is_err(), "accepted {:?}", config);
        }
    }

    #[test]
    fn test_validate_boundaries() {
        let config = Config {
            support_threshold: 100,
            max_file_size: 1024,
            analysis_timeout: 1000,
            fail_on: "low".to_string(),
            ..Default::default()
        };
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_discover_and_relative_compat_data() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());

        std::fs::write(
            temp.path().join(".baselinecheck.yaml"),
            "compat_data:\n  - data/extra.json\n",
        )
        .unwrap();
        let (config, path) = Config::load(None, temp.path()).unwrap();
        assert_eq!(path, Some(temp.path().join(".baselinecheck.yaml")));
        assert_eq!(
            config.compat_data,
            vec![temp.path().join("data/extra.json")]
        );
    }

    #[test]
    fn test_knowledge_base_layers_compat_data() {
        let temp = TempDir::new().unwrap();
        let extra = temp.path().join("extra.json");
        std::fs::write(
            &extra,
            r#"{"css": {"properties": {"field-sizing": {"__compat": {"support": {
                "chrome": {"version_added": "123"},
                "edge": {"version_added": "123"}
            }}}}}}"#,
        )
        .unwrap();

        let config = Config {
            compat_data: vec![extra],
            ..Default::default()
        };
        let kb = config.knowledge_base().unwrap();
        assert!(kb.lookup("css.properties.field-sizing").is_some());
        assert!(kb.lookup("css.properties.display").is_some());
    }

    #[test]
    fn test_missing_compat_data_is_error() {
        let config = Config {
            compat_data: vec![PathBuf::from("/nonexistent/compat.json")],
            ..Default::default()
        };
        assert!(config.knowledge_base().is_err());
    }
}
