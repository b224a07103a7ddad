//! Conservative extraction of class/id dependencies from selector text.
//!
//! Two tiers:
//! - Fast path: a selector made of an optional tag/whitespace prefix followed
//!   by a class or id (`.foo`, `div .foo`, `#bar .baz`) depends only on that
//!   first anchor, since nothing further right can match without it.
//! - General path: drop every `:not(...)` group, then collect every `.name`
//!   and `#name` left in the text. The rule is kept if any of them is present.
//!
//! Analysis never fails. A selector with no class or id yields an empty
//! dependency.

use crate::SelectorDependency;
use log::trace;
use regex::Regex;

/// One identifier code point or CSS escape (`\:` or `\31 `).
const IDENT: &str = concat!(
    r"(?:[A-Za-z0-9_\-\x{80}-\x{10FFFF}]",
    r"|\\[0-9A-Fa-f]{1,6}[ \t\n\r\f]?",
    r"|\\[^0-9A-Fa-f\r\n\f])+",
);

/// Compiled patterns for selector analysis. Build once, share freely.
#[derive(Clone, Debug)]
pub struct SelectorAnalyzer {
    /// Leading tag/whitespace prefix followed by the first class or id.
    anchor: Regex,
    /// A `:not(...)` negation group.
    negation: Regex,
    /// Any class or id token.
    token: Regex,
}

impl SelectorAnalyzer {
    /// Compile the analyzer patterns.
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            anchor: Regex::new(&format!(r"^[A-Za-z\s]*([.#])({IDENT})"))?,
            negation: Regex::new(r":not\([^)]*\)")?,
            token: Regex::new(&format!(r"([.#])({IDENT})"))?,
        })
    }

    /// Dependencies of a single selector.
    pub fn analyze(&self, selector: &str) -> SelectorDependency {
        if let Some(anchor) = self.anchor.captures(selector)
            && let (Some(marker), Some(name)) = (anchor.get(1), anchor.get(2))
        {
            trace!("selector {selector:?}: anchored on {}", marker.as_str());
            return [(marker_char(marker.as_str()), unescape(name.as_str()))]
                .into_iter()
                .collect();
        }

        let positive = self.negation.replace_all(selector, "");
        let dependency: SelectorDependency = self
            .token
            .captures_iter(&positive)
            .filter_map(|found| {
                let marker = found.get(1)?;
                let name = found.get(2)?;
                Some((marker_char(marker.as_str()), unescape(name.as_str())))
            })
            .collect();
        trace!("selector {selector:?}: general scan found {dependency:?}");
        dependency
    }

    /// Union of the dependencies of every selector.
    pub fn analyze_all<'sel, Selectors>(&self, selectors: Selectors) -> SelectorDependency
    where
        Selectors: IntoIterator<Item = &'sel str>,
    {
        let mut merged = SelectorDependency::new();
        for selector in selectors {
            merged.merge(self.analyze(selector));
        }
        merged
    }
}

fn marker_char(marker: &str) -> char {
    if marker == "#" { '#' } else { '.' }
}

/// Resolve CSS escapes so `sm\:p-4` and `\31 0` compare equal to the
/// class attribute values `sm:p-4` and `10`.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(current) = chars.next() {
        if current != '\\' {
            out.push(current);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6
            && let Some(&digit) = chars.peek()
            && digit.is_ascii_hexdigit()
        {
            hex.push(digit);
            chars.next();
        }
        if hex.is_empty() {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        if chars.peek().is_some_and(|next| next.is_ascii_whitespace()) {
            chars.next();
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|code| *code != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(decoded);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::unescape;

    /// Escapes resolve to the characters they stand for.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn unescape_identifiers() {
        assert_eq!(unescape("plain-name"), "plain-name");
        assert_eq!(unescape(r"sm\:p-4"), "sm:p-4");
        assert_eq!(unescape(r"\31 0"), "10");
        assert_eq!(unescape(r"w-1\/2"), "w-1/2");
        assert_eq!(unescape(r"\0 x"), "\u{FFFD}x");
    }
}
