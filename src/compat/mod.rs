//! Compatibility knowledge base.
//!
//! Browser-support data is loaded once into a typed tree keyed by dotted
//! identifiers (`css.properties.gap`, `html.elements.dialog.open`, ...).
//! Two source schemas are understood:
//!
//! - Hierarchical (browser-compat-data style): nested objects where a node
//!   carrying `__compat.support` describes a feature.
//! - Flat (web-features style): `{"features": {id: {"compat_features": [...],
//!   "status": {"support": {...}}}}}`, where one support record applies to
//!   every listed key.
//!
//! Both are normalized into [`FeatureSupportFact`] at load time, so lookups
//! never see malformed data. Lookups go through [`CompatAdapter`], which
//! owns the per-run cache.

mod adapter;
mod support;

pub use adapter::CompatAdapter;
pub use support::{Browser, BrowserSupport, FeatureSupportFact, Version};

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Built-in hierarchical snapshot.
const BUILTIN_BCD: &str = include_str!("../../data/bcd.json");

/// Built-in flat snapshot.
const BUILTIN_WEB_FEATURES: &str = include_str!("../../data/web-features.json");

/// Errors raised while loading compat data.
#[derive(Error, Debug)]
pub enum CompatDataError {
    #[error("reading compat data {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing compat data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compat data must be a JSON object at the top level")]
    NotAnObject,
}

/// One node of the knowledge-base tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CompatNode {
    /// A feature with support data, possibly carrying sub-features
    /// (e.g. `html.elements.dialog` and `html.elements.dialog.open`).
    Feature {
        fact: FeatureSupportFact,
        subfeatures: BTreeMap<String, CompatNode>,
    },
    /// A namespace with no support data of its own.
    Group(BTreeMap<String, CompatNode>),
}

impl CompatNode {
    fn children(&self) -> &BTreeMap<String, CompatNode> {
        match self {
            CompatNode::Feature { subfeatures, .. } => subfeatures,
            CompatNode::Group(children) => children,
        }
    }

    fn children_mut(&mut self) -> &mut BTreeMap<String, CompatNode> {
        match self {
            CompatNode::Feature { subfeatures, .. } => subfeatures,
            CompatNode::Group(children) => children,
        }
    }

    fn fact(&self) -> Option<&FeatureSupportFact> {
        match self {
            CompatNode::Feature { fact, .. } => Some(fact),
            CompatNode::Group(_) => None,
        }
    }

    /// Attach `fact` to this node unless it already has one.
    fn fill_fact(&mut self, fact: FeatureSupportFact) {
        if let CompatNode::Group(children) = self {
            let subfeatures = std::mem::take(children);
            *self = CompatNode::Feature { fact, subfeatures };
        }
    }

    /// Merge `other` into `self`; existing facts win.
    fn merge(&mut self, other: CompatNode) {
        let other_children = match other {
            CompatNode::Feature { fact, subfeatures } => {
                self.fill_fact(fact);
                subfeatures
            }
            CompatNode::Group(children) => children,
        };
        merge_children(self.children_mut(), other_children);
    }

    fn count_features(&self) -> usize {
        let own = usize::from(self.fact().is_some());
        own + self
            .children()
            .values()
            .map(CompatNode::count_features)
            .sum::<usize>()
    }
}

fn merge_children(into: &mut BTreeMap<String, CompatNode>, from: BTreeMap<String, CompatNode>) {
    for (name, node) in from {
        match into.get_mut(&name) {
            Some(existing) => existing.merge(node),
            None => {
                into.insert(name, node);
            }
        }
    }
}

/// Read-only compatibility knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    root: BTreeMap<String, CompatNode>,
}

impl KnowledgeBase {
    /// An empty knowledge base; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The snapshot bundled with the binary.
    pub fn builtin() -> Result<Self, CompatDataError> {
        let mut kb = Self::empty();
        kb.merge_json_str(BUILTIN_BCD)?;
        kb.merge_json_str(BUILTIN_WEB_FEATURES)?;
        Ok(kb)
    }

    /// Layer a JSON document (either schema) onto the knowledge base.
    ///
    /// Keys already present keep their data.
    pub fn merge_json_str(&mut self, json: &str) -> Result<(), CompatDataError> {
        let doc: Value = serde_json::from_str(json)?;
        let obj = doc.as_object().ok_or(CompatDataError::NotAnObject)?;
        if is_flat_schema(obj) {
            self.merge_flat(obj);
        } else {
            merge_children(&mut self.root, build_children(obj));
        }
        Ok(())
    }

    /// Layer a JSON file onto the knowledge base.
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CompatDataError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CompatDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_json_str(&content)
    }

    /// Descend the tree one dotted segment at a time.
    ///
    /// Returns `None` when any segment is missing or the final node has no
    /// support data of its own.
    pub fn lookup(&self, key: &str) -> Option<&FeatureSupportFact> {
        let mut segments = key.split('.');
        let mut node = self.root.get(segments.next()?)?;
        for segment in segments {
            node = node.children().get(segment)?;
        }
        node.fact()
    }

    /// Number of keys that carry support data.
    pub fn feature_count(&self) -> usize {
        self.root.values().map(CompatNode::count_features).sum()
    }

    fn merge_flat(&mut self, doc: &Map<String, Value>) {
        let Some(features) = doc.get("features").and_then(Value::as_object) else {
            return;
        };
        for entry in features.values() {
            let Some(keys) = entry.get("compat_features").and_then(Value::as_array) else {
                continue;
            };
            let fact = entry
                .get("status")
                .and_then(|s| s.get("support"))
                .and_then(Value::as_object)
                .map(parse_flat_support)
                .unwrap_or_default();
            for key in keys.iter().filter_map(Value::as_str) {
                self.insert_if_absent(key, fact);
            }
        }
    }

    fn insert_if_absent(&mut self, key: &str, fact: FeatureSupportFact) {
        let mut segments = key.split('.').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return;
        };
        let mut node = self
            .root
            .entry(first.to_string())
            .or_insert_with(|| CompatNode::Group(BTreeMap::new()));
        for segment in segments {
            node = node
                .children_mut()
                .entry(segment.to_string())
                .or_insert_with(|| CompatNode::Group(BTreeMap::new()));
        }
        node.fill_fact(fact);
    }
}

fn is_flat_schema(doc: &Map<String, Value>) -> bool {
    doc.get("features")
        .and_then(Value::as_object)
        .map(|features| {
            features
                .values()
                .any(|f| f.get("compat_features").is_some())
        })
        .unwrap_or(false)
}

fn build_children(obj: &Map<String, Value>) -> BTreeMap<String, CompatNode> {
    obj.iter()
        .filter(|(name, _)| !name.starts_with("__"))
        .filter_map(|(name, value)| build_node(value).map(|node| (name.clone(), node)))
        .collect()
}

fn build_node(value: &Value) -> Option<CompatNode> {
    let obj = value.as_object()?;
    let children = build_children(obj);
    match obj.get("__compat").and_then(parse_compat) {
        Some(fact) => Some(CompatNode::Feature {
            fact,
            subfeatures: children,
        }),
        None => Some(CompatNode::Group(children)),
    }
}

fn parse_compat(compat: &Value) -> Option<FeatureSupportFact> {
    let support = compat.get("support")?.as_object()?;
    let mut fact = FeatureSupportFact::default();
    for browser in Browser::ALL {
        if let Some(entry) = support.get(browser.as_str()) {
            fact.set(browser, parse_browser_entry(entry));
        }
    }
    // Chromium-based Edge data is often recorded as a mirror of Chrome.
    if support.get("edge").and_then(Value::as_str) == Some("mirror") {
        fact.edge = fact.chrome;
    }
    Some(fact)
}

/// Pick the first unflagged, unprefixed statement for a browser.
fn parse_browser_entry(entry: &Value) -> BrowserSupport {
    match entry {
        Value::Array(statements) => statements
            .iter()
            .find(|s| is_primary_statement(s))
            .map(parse_statement)
            .unwrap_or_default(),
        Value::Object(_) if is_primary_statement(entry) => parse_statement(entry),
        _ => BrowserSupport::Unsupported,
    }
}

fn is_primary_statement(statement: &Value) -> bool {
    statement.is_object()
        && statement.get("flags").is_none()
        && statement.get("prefix").is_none()
        && statement.get("alternative_name").is_none()
}

fn parse_statement(statement: &Value) -> BrowserSupport {
    let added = match statement.get("version_added") {
        Some(Value::String(raw)) => match Version::parse(raw) {
            Some(v) => Some(v),
            None => return BrowserSupport::Unsupported,
        },
        Some(Value::Bool(true)) => None,
        _ => return BrowserSupport::Unsupported,
    };

    match statement.get("version_removed") {
        Some(Value::String(raw)) => BrowserSupport::Removed {
            added,
            removed: Version::parse(raw),
        },
        Some(Value::Bool(true)) => BrowserSupport::Removed {
            added,
            removed: None,
        },
        _ => BrowserSupport::Supported { since: added },
    }
}

fn parse_flat_support(support: &Map<String, Value>) -> FeatureSupportFact {
    let mut fact = FeatureSupportFact::default();
    for browser in Browser::ALL {
        let parsed = match support.get(browser.as_str()) {
            Some(Value::String(raw)) => Version::parse(raw)
                .map(|v| BrowserSupport::Supported { since: Some(v) })
                .unwrap_or_default(),
            Some(Value::Bool(true)) => BrowserSupport::Supported { since: None },
            _ => BrowserSupport::Unsupported,
        };
        fact.set(browser, parsed);
    }
    fact
}
