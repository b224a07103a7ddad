//! The parser/serializer pair the filter is built on.

use css_syntax::{Rule, Stylesheet, parse_stylesheet, serialize_rule};

/// Upstream parser and downstream serializer.
///
/// `parse` must be silent: malformed input yields partial results plus
/// [`css_syntax::SyntaxError`] entries, and `None` only when no stylesheet
/// structure could be produced at all. `serialize` renders one rule with no
/// cross-rule state.
pub trait StylesheetBackend {
    fn parse(&self, css: &str) -> Option<Stylesheet>;

    fn serialize(&self, rule: &Rule, compress: bool) -> String;
}

/// The default backend, built on `cssparser`. Always produces a stylesheet.
#[derive(Clone, Copy, Debug, Default)]
pub struct CssparserBackend;

impl StylesheetBackend for CssparserBackend {
    fn parse(&self, css: &str) -> Option<Stylesheet> {
        Some(parse_stylesheet(css))
    }

    fn serialize(&self, rule: &Rule, compress: bool) -> String {
        serialize_rule(rule, compress)
    }
}
