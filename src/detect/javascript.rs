//! Modern JavaScript API and syntax detection.

use lazy_static::lazy_static;
use regex::Regex;

use super::{Detector, FeatureKind, LineIndex, RawMatch};

/// Tokens reported when they appear as whole words.
pub const VOCABULARY: &[&str] = &[
    "fetch",
    "Promise",
    "async",
    "await",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "const",
    "let",
    "class",
    "Symbol",
    "Proxy",
    "Reflect",
    "BigInt",
    "globalThis",
    "structuredClone",
    "AbortController",
    "IntersectionObserver",
    "ResizeObserver",
];

lazy_static! {
    static ref VOCABULARY_PATTERN: Regex =
        Regex::new(&format!(r"\b(?:{})\b", VOCABULARY.join("|"))).unwrap();
}

/// Detector for JavaScript and TypeScript files.
pub struct JavaScriptDetector;

impl Detector for JavaScriptDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::JavaScript
    }

    fn scan<'t>(&self, text: &'t str) -> Box<dyn Iterator<Item = Option<RawMatch>> + 't> {
        let lines = LineIndex::new(text);
        Box::new(VOCABULARY_PATTERN.find_iter(text).map(move |m| {
            let (line, column) = lines.position(m.start());
            Some(RawMatch {
                token: m.as_str().to_string(),
                kind: FeatureKind::JavaScript,
                line,
                column,
                context: None,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        JavaScriptDetector.detect(text).map(|m| m.token).collect()
    }

    #[test]
    fn test_promise_fetch_scenario() {
        let text = "const p = new Promise((res)=>{ fetch('/x').then(res) })";
        let found: Vec<_> = JavaScriptDetector.detect(text).collect();
        let names: Vec<_> = found.iter().map(|m| m.token.as_str()).collect();
        assert_eq!(names, vec!["const", "Promise", "fetch"]);
        assert_eq!(found[1].column, 14);
        assert_eq!(found[2].column, 31);
    }

    #[test]
    fn test_whole_word_only() {
        // WeakMap must not also report Map; identifiers containing keywords are ignored.
        assert_eq!(tokens("new WeakMap()"), vec!["WeakMap"]);
        assert_eq!(tokens("const constant = fetchAll(isAsync)"), vec!["const"]);
        assert!(tokens("letter.classList").is_empty());
    }

    #[test]
    fn test_async_await_lines() {
        let text = "async function load() {\n  const r = await fetch(url);\n}";
        let found: Vec<_> = JavaScriptDetector.detect(text).collect();
        let summary: Vec<_> = found
            .iter()
            .map(|m| (m.token.as_str(), m.line, m.column))
            .collect();
        assert_eq!(
            summary,
            vec![("async", 1, 0), ("const", 2, 2), ("await", 2, 12), ("fetch", 2, 18)]
        );
    }

    #[test]
    fn test_typescript_generics() {
        assert_eq!(
            tokens("let cache: Map<string, Set<number>> = new Map();"),
            vec!["let", "Map", "Set", "Map"]
        );
    }
}
