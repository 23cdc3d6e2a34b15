//! HTML element and attribute detection.
//!
//! Reports opening-tag names and the attributes written on them. Works on
//! plain HTML as well as Vue and Svelte single-file components; comments
//! and the bodies of `<script>`/`<style>` blocks are not scanned.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

use super::{Detector, FeatureKind, LineIndex, RawMatch, SkipSpans};

lazy_static! {
    static ref OPEN_TAG: Regex = Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)").unwrap();

    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();

    static ref RAW_TEXT_BODY: Regex =
        Regex::new(r"(?is)<(?:script|style)\b[^>]*>(.*?)</(?:script|style)\s*>").unwrap();
}

/// Elements too common to be worth reporting.
static ELEMENT_DENYLIST: phf::Set<&'static str> = phf_set! {
    "div", "span", "p", "a", "img",
    "h1", "h2", "h3", "h4", "h5", "h6",
};

/// Attributes too common to be worth reporting.
static ATTRIBUTE_DENYLIST: phf::Set<&'static str> = phf_set! {
    "class", "id", "style", "href", "src", "alt", "title",
    "name", "type", "value", "width", "height",
};

/// Detector for HTML and component template files.
pub struct HtmlDetector;

impl Detector for HtmlDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::Html
    }

    fn scan<'t>(&self, text: &'t str) -> Box<dyn Iterator<Item = Option<RawMatch>> + 't> {
        let lines = LineIndex::new(text);
        let comments = SkipSpans::from_regex(&COMMENT, text);
        let raw_text = SkipSpans::from_capture(&RAW_TEXT_BODY, text);

        Box::new(OPEN_TAG.captures_iter(text).flat_map(move |caps| {
            let Some(name) = caps.get(1) else {
                return vec![None];
            };
            if comments.contains(name.start()) || raw_text.contains(name.start()) {
                return vec![None];
            }

            let mut found = Vec::new();
            let tag = name.as_str().to_ascii_lowercase();
            if ELEMENT_DENYLIST.contains(tag.as_str()) {
                found.push(None);
            } else {
                let (line, column) = lines.position(name.start());
                found.push(Some(RawMatch {
                    token: tag.clone(),
                    kind: FeatureKind::Html,
                    line,
                    column,
                    context: None,
                }));
            }

            for (offset, attr) in tag_attributes(text, name.end()) {
                if is_ignored_attribute(&attr) {
                    found.push(None);
                    continue;
                }
                let (line, column) = lines.position(offset);
                found.push(Some(RawMatch {
                    context: Some(format!("{}[{}]", tag, attr)),
                    token: attr,
                    kind: FeatureKind::Html,
                    line,
                    column,
                }));
            }
            found
        }))
    }
}

fn is_ignored_attribute(attr: &str) -> bool {
    ATTRIBUTE_DENYLIST.contains(attr)
        || attr.starts_with("data-")
        || attr.starts_with("aria-")
        || (attr.starts_with("on") && attr.len() > 2)
        // Framework directives and bindings: v-if, x-data, :prop, @click, #slot
        || attr.starts_with("v-")
        || attr.starts_with("x-")
        || attr.contains([':', '@', '#', '.'])
}

/// Attribute names (with byte offsets) inside the tag whose name ends at
/// `start`, stopping at the first unquoted `>`. An unquoted `<` also ends
/// the tag, so an unclosed tag never absorbs the one after it.
fn tag_attributes(text: &str, start: usize) -> Vec<(usize, String)> {
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'>' | b'<' => break,
            b if b.is_ascii_whitespace() || b == b'/' => i += 1,
            b'=' => {
                i = skip_value(bytes, i + 1);
            }
            b'"' | b'\'' => {
                // Stray quote outside a value; skip the quoted run.
                i = skip_quoted(bytes, i);
            }
            _ => {
                let name_start = i;
                while i < bytes.len() && !is_name_terminator(bytes[i]) {
                    i += 1;
                }
                if let Some(name) = text.get(name_start..i) {
                    attrs.push((name_start, name.to_ascii_lowercase()));
                }
            }
        }
    }

    attrs
}

fn is_name_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'<' | b'/' | b'"' | b'\'')
}

fn skip_value(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'"') | Some(b'\'') => skip_quoted(bytes, i),
        Some(b'{') => skip_braced(bytes, i),
        _ => {
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'>' | b'<')
            {
                i += 1;
            }
            i
        }
    }
}

fn skip_quoted(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    match bytes[i + 1..].iter().position(|&b| b == quote) {
        Some(rel) => i + 1 + rel + 1,
        None => bytes.len(),
    }
}

/// Svelte/JSX-style `attr={expr}` values.
fn skip_braced(bytes: &[u8], mut i: usize) -> usize {
    let mut depth = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(text: &str) -> Vec<(String, Option<String>)> {
        HtmlDetector
            .detect(text)
            .map(|m| (m.token, m.context))
            .collect()
    }

    #[test]
    fn test_denylisted_elements_are_skipped() {
        let found = summary("<div><span>x</span><dialog></dialog><H1>t</H1></div>");
        assert_eq!(found, vec![("dialog".to_string(), None)]);
    }

    #[test]
    fn test_tag_names_are_lowercased() {
        let found: Vec<_> = HtmlDetector.detect("<main>\n  <DIALOG>").collect();
        assert_eq!(found[0].token, "main");
        assert_eq!(found[1].token, "dialog");
        assert_eq!((found[1].line, found[1].column), (2, 3));
    }

    #[test]
    fn test_attributes_carry_context() {
        let text = r#"<img src="a.png" loading="lazy" alt="x">"#;
        let found: Vec<_> = HtmlDetector.detect(text).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].token, "loading");
        assert_eq!(found[0].context.as_deref(), Some("img[loading]"));
        assert_eq!(found[0].column, text.find("loading").unwrap());
    }

    #[test]
    fn test_boolean_and_unquoted_attributes() {
        let found = summary("<dialog open><input inert autofocus value=3 disabled>");
        let names: Vec<_> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(
            names,
            vec!["dialog", "open", "input", "inert", "autofocus", "disabled"]
        );
        assert_eq!(found[1].1.as_deref(), Some("dialog[open]"));
    }

    #[test]
    fn test_quoted_values_are_not_attributes() {
        let found = summary(r#"<details title="open inert > hidden" class='a b'>"#);
        assert_eq!(found, vec![("details".to_string(), None)]);
    }

    #[test]
    fn test_framework_bindings_are_ignored() {
        let text = concat!(
            r#"<template><button @click="go" :disabled="x" v-if="y" "#,
            r#"data-id="1" onclick="f()" popover>Go</button></template>"#,
        );
        let names: Vec<_> = summary(text).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["template", "button", "popover"]);
    }

    #[test]
    fn test_comments_and_script_bodies_are_skipped() {
        let text = concat!(
            "<!-- <dialog> -->\n",
            "<script>if (a<b) {}</script>\n",
            "<style>p<q{}</style>\n",
            "<search></search>",
        );
        let names: Vec<_> = summary(text).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["script", "style", "search"]);
    }

    #[test]
    fn test_svelte_braced_values() {
        let text = "<section hidden={ flag ? {a: 1} : null } enterkeyhint=\"go\">";
        let names: Vec<_> = summary(text).into_iter().map(|(t, _)| t).collect();
        assert_eq!(names, vec!["section", "hidden", "enterkeyhint"]);
    }

    #[test]
    fn test_closing_tags_and_doctype_are_not_opening_tags() {
        assert!(summary("<!DOCTYPE html></section>").is_empty());
    }

    #[test]
    fn test_unclosed_tag_ends_at_next_tag() {
        let found = summary("<section\n<dialog open>");
        assert_eq!(
            found,
            vec![
                ("section".to_string(), None),
                ("dialog".to_string(), None),
                ("open".to_string(), Some("dialog[open]".to_string())),
            ]
        );
    }

    #[test]
    fn test_unquoted_value_stops_at_next_tag() {
        let found = summary("<input size=3<search hidden>");
        let names: Vec<_> = found.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(names, vec!["input", "size", "search", "hidden"]);
        assert_eq!(found[3].1.as_deref(), Some("search[hidden]"));
    }

    #[test]
    fn test_dropped_candidates_are_yielded_as_none() {
        let scanned: Vec<_> = HtmlDetector.scan("<div class=\"x\"></div>").collect();
        assert_eq!(scanned, vec![None, None]);
    }
}
