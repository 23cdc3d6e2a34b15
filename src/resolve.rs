//! Token to knowledge-base key resolution.
//!
//! Each detector token maps to an ordered list of candidate keys. The first
//! candidate the knowledge base knows wins, even when a later one would
//! classify more favourably: an ambiguous token should never be reported as
//! widely available by accident. When nothing resolves, the first candidate
//! is returned as a best guess and classifies as limited availability.

use phf::phf_map;

use crate::compat::CompatAdapter;
use crate::detect::FeatureKind;

/// JavaScript tokens whose key does not follow `javascript.builtins.<token>`.
static JS_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    "async" => "javascript.statements.async_function",
    "await" => "javascript.operators.await",
    "class" => "javascript.classes",
    "const" => "javascript.statements.const",
    "let" => "javascript.statements.let",
};

/// Ordered candidate keys for a detector token.
pub fn candidate_keys(kind: FeatureKind, token: &str, context: Option<&str>) -> Vec<String> {
    match kind {
        FeatureKind::Css => css_candidates(token),
        FeatureKind::JavaScript => js_candidates(token),
        FeatureKind::Html => match context.and_then(parse_attribute_context) {
            Some((element, attribute)) => attribute_candidates(element, attribute),
            None => vec![format!("html.elements.{}", token.to_ascii_lowercase())],
        },
    }
}

/// Resolve a token to a knowledge-base key.
///
/// Returns the first candidate that resolves, else the first candidate.
pub fn resolve_feature_key(
    adapter: &CompatAdapter<'_>,
    kind: FeatureKind,
    token: &str,
    context: Option<&str>,
) -> String {
    let candidates = candidate_keys(kind, token, context);
    let hit = candidates.iter().position(|key| adapter.contains(key));
    match hit {
        Some(idx) => candidates[idx].clone(),
        None => {
            tracing::debug!(token, kind = %kind, "no compat data for any candidate key");
            candidates
                .into_iter()
                .next()
                .unwrap_or_else(|| format!("{}.{}", kind.as_str(), token))
        }
    }
}

fn css_candidates(token: &str) -> Vec<String> {
    let property = token.to_ascii_lowercase();
    if property.starts_with("--") {
        return vec!["css.properties.custom-property".to_string()];
    }

    let mut keys = vec![format!("css.properties.{}", property)];
    if let Some(unprefixed) = strip_vendor_prefix(&property) {
        keys.push(format!("css.properties.{}", unprefixed));
    }
    keys
}

fn strip_vendor_prefix(property: &str) -> Option<&str> {
    ["-webkit-", "-moz-", "-ms-", "-o-"]
        .iter()
        .find_map(|prefix| property.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
}

fn js_candidates(token: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(alias) = JS_ALIASES.get(token) {
        keys.push(alias.to_string());
    }
    keys.push(format!("javascript.builtins.{}", token));
    keys.push(format!("api.{}", token));
    keys.push(format!("api.Window.{}", token));
    keys
}

fn attribute_candidates(element: &str, attribute: &str) -> Vec<String> {
    let mut keys = vec![
        format!("html.elements.{}.{}", element, attribute),
        format!("html.global_attributes.{}", attribute),
    ];
    if attribute.contains('-') {
        let normalized = attribute.replace('-', "_");
        keys.push(format!("html.elements.{}.{}", element, normalized));
        keys.push(format!("html.global_attributes.{}", normalized));
    }
    keys
}

/// Split `element[attribute]`.
fn parse_attribute_context(context: &str) -> Option<(&str, &str)> {
    let (element, rest) = context.split_once('[')?;
    let attribute = rest.strip_suffix(']')?;
    if element.is_empty() || attribute.is_empty() {
        return None;
    }
    Some((element, attribute))
}
