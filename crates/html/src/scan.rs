use log::trace;
use regex::{Captures, Regex};
use std::collections::HashSet;

/// Distinct whitespace-separated tokens found in one document's attributes.
///
/// Built fresh for every document and never shared between documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<String>,
}

impl TokenSet {
    /// Split an attribute value on whitespace and add every token.
    pub fn insert_value(&mut self, value: &str) {
        for token in value.split_whitespace() {
            if !self.tokens.contains(token) {
                self.tokens.insert(token.to_owned());
            }
        }
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Build an attribute pattern: case-insensitive name, then a double-quoted,
/// single-quoted, or unquoted value.
fn attribute_pattern(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r#"(?i)\b{name}\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#
    ))
}

/// The value of whichever quoting alternative matched.
fn attribute_value<'doc>(found: &Captures<'doc>) -> Option<&'doc str> {
    found
        .get(1)
        .or_else(|| found.get(2))
        .or_else(|| found.get(3))
        .map(|value| value.as_str())
}

/// Compiled attribute patterns. Build once, share freely between threads.
#[derive(Clone, Debug)]
pub struct ClassScanner {
    class_attribute: Regex,
    id_attribute: Regex,
}

impl ClassScanner {
    /// Compile the attribute patterns.
    ///
    /// # Errors
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            class_attribute: attribute_pattern("class")?,
            id_attribute: attribute_pattern("id")?,
        })
    }

    /// Every distinct token of every `class` attribute in `html`.
    pub fn extract_classes(&self, html: &str) -> TokenSet {
        let classes = collect_values(&self.class_attribute, html);
        trace!("found {} distinct classes", classes.len());
        classes
    }

    /// Every distinct token of every `id` attribute in `html`.
    pub fn extract_ids(&self, html: &str) -> TokenSet {
        let ids = collect_values(&self.id_attribute, html);
        trace!("found {} distinct ids", ids.len());
        ids
    }
}

fn collect_values(pattern: &Regex, html: &str) -> TokenSet {
    let mut set = TokenSet::default();
    for found in pattern.captures_iter(html) {
        if let Some(value) = attribute_value(&found) {
            set.insert_value(value);
        }
    }
    set
}
