//! CSS property detection.
//!
//! Finds `property:` declarations in CSS, SCSS, Sass and Less sources.
//! Pseudo-class selectors (`a:hover {`) and commented-out code are skipped,
//! as are a handful of properties every browser has always supported.

use lazy_static::lazy_static;
use phf::phf_set;
use regex::Regex;

use super::{Detector, FeatureKind, LineIndex, RawMatch, SkipSpans};

lazy_static! {
    /// An identifier opening a line or following a brace or `;`, then a colon.
    static ref DECLARATION: Regex =
        Regex::new(r"(?m)(?:^|[{};])\s*(-{0,2}[a-zA-Z][a-zA-Z0-9-]*)\s*:").unwrap();

    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)/\*.*?\*/").unwrap();
}

/// Properties too common to be worth reporting.
static DENYLIST: phf::Set<&'static str> = phf_set! {
    "color",
    "background",
    "margin",
    "padding",
    "width",
    "height",
};

/// Detector for CSS-family files.
pub struct CssDetector;

impl Detector for CssDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::Css
    }

    fn scan<'t>(&self, text: &'t str) -> Box<dyn Iterator<Item = Option<RawMatch>> + 't> {
        let lines = LineIndex::new(text);
        let comments = SkipSpans::from_regex(&BLOCK_COMMENT, text);
        let mut delimiters = DelimiterScan::new(text);

        Box::new(DECLARATION.captures_iter(text).map(move |caps| {
            let name = caps.get(1)?;
            let whole = caps.get(0)?;
            if comments.contains(name.start())
                || DENYLIST.contains(name.as_str().to_ascii_lowercase().as_str())
                || delimiters.first_from(whole.end()) == Some(b'{')
            {
                return None;
            }
            let (line, column) = lines.position(name.start());
            Some(RawMatch {
                token: name.as_str().to_string(),
                kind: FeatureKind::Css,
                line,
                column,
                context: None,
            })
        }))
    }
}

/// Finds the first `;`, `}` or `{` at or after a position. A colon whose
/// next delimiter is `{` belongs to a selector, not a declaration.
///
/// Queries must come in ascending order; the last hit is reused until the
/// query passes it, so a whole scan costs one pass over the text.
struct DelimiterScan<'t> {
    bytes: &'t [u8],
    next: Option<usize>,
}

impl<'t> DelimiterScan<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            bytes: text.as_bytes(),
            next: None,
        }
    }

    fn first_from(&mut self, from: usize) -> Option<u8> {
        let pos = match self.next {
            Some(pos) if pos >= from => pos,
            _ => {
                let pos = self
                    .bytes
                    .get(from..)
                    .and_then(|rest| rest.iter().position(|&b| matches!(b, b';' | b'}' | b'{')))
                    .map_or(self.bytes.len(), |rel| from + rel);
                self.next = Some(pos);
                pos
            }
        };
        self.bytes.get(pos).copied()
    }
}
