//! Rule classification: one [`CandidateRule`] per parsed rule or recovered
//! error fragment, computed once per stylesheet.

use crate::{ShakeError, ShakeOptions, StylesheetBackend};
use css_selectors::{SelectorAnalyzer, SelectorDependency};
use css_syntax::{Rule, Stylesheet, SyntaxError};
use html::TokenSet;
use log::debug;

/// Whether a candidate is kept unconditionally or depends on document tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Retention {
    /// Kept for every document (no selectors, or unparsed source text).
    Always,
    /// Kept when any dependency token is present in the document.
    /// An empty dependency is never satisfied.
    Dependent(SelectorDependency),
}

/// One unit of output: the serialized CSS of a rule and when to keep it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateRule {
    css: String,
    retention: Retention,
}

impl CandidateRule {
    pub const fn always(css: String) -> Self {
        Self {
            css,
            retention: Retention::Always,
        }
    }

    pub const fn dependent(css: String, dependency: SelectorDependency) -> Self {
        Self {
            css,
            retention: Retention::Dependent(dependency),
        }
    }

    /// The exact text emitted when this candidate is kept.
    pub fn css(&self) -> &str {
        &self.css
    }

    pub const fn is_always_included(&self) -> bool {
        matches!(self.retention, Retention::Always)
    }

    /// The merged selector dependency, `None` for always-include candidates.
    pub const fn dependency(&self) -> Option<&SelectorDependency> {
        match &self.retention {
            Retention::Always => None,
            Retention::Dependent(dependency) => Some(dependency),
        }
    }

    /// Selectors were present but none referenced a class or id, so no
    /// document can ever retain this candidate.
    pub fn is_unreachable(&self) -> bool {
        self.dependency().is_some_and(SelectorDependency::is_empty)
    }

    /// Decide retention against one document's class tokens, and its id
    /// tokens when id matching is enabled.
    pub fn is_retained_by(&self, classes: &TokenSet, ids: Option<&TokenSet>) -> bool {
        match &self.retention {
            Retention::Always => true,
            Retention::Dependent(dependency) => {
                dependency.classes().any(|class| classes.contains(class))
                    || ids.is_some_and(|id_tokens| {
                        dependency.ids().any(|id| id_tokens.contains(id))
                    })
            }
        }
    }
}

/// The selectors a rule exposes for analysis.
///
/// Style rules expose their own list, grouping rules (`@media`, `@supports`,
/// ...) the union of every nested style rule's selectors, and other at-rules
/// nothing.
pub fn rule_selectors(rule: &Rule) -> Option<Vec<&str>> {
    match rule {
        Rule::Style(style) => Some(style.selectors.iter().map(String::as_str).collect()),
        Rule::Grouping(group) => {
            let mut selectors = Vec::new();
            collect_nested_selectors(&group.rules, &mut selectors);
            Some(selectors)
        }
        Rule::At(_) => None,
    }
}

fn collect_nested_selectors<'rule>(rules: &'rule [Rule], out: &mut Vec<&'rule str>) {
    for rule in rules {
        match rule {
            Rule::Style(style) => out.extend(style.selectors.iter().map(String::as_str)),
            Rule::Grouping(group) => collect_nested_selectors(&group.rules, out),
            Rule::At(_) => {}
        }
    }
}

/// Turns parsed rules into candidates.
#[derive(Clone, Debug)]
pub struct Classifier {
    analyzer: SelectorAnalyzer,
    compress: bool,
    keep_unanchored_rules: bool,
}

impl Classifier {
    /// # Errors
    /// Returns [`ShakeError::Pattern`] if the selector patterns fail to compile.
    pub fn new(options: &ShakeOptions) -> Result<Self, ShakeError> {
        Ok(Self {
            analyzer: SelectorAnalyzer::new()?,
            compress: options.compress,
            keep_unanchored_rules: options.keep_unanchored_rules,
        })
    }

    /// Classify one rule, serializing it exactly once.
    pub fn classify<Backend>(&self, backend: &Backend, rule: &Rule) -> CandidateRule
    where
        Backend: StylesheetBackend + ?Sized,
    {
        let css = backend.serialize(rule, self.compress);
        let Some(selectors) = rule_selectors(rule).filter(|selectors| !selectors.is_empty()) else {
            return CandidateRule::always(css);
        };
        let dependency = self.analyzer.analyze_all(selectors.iter().copied());
        if dependency.is_empty() {
            debug!("selectors {selectors:?} reference no class or id");
            if self.keep_unanchored_rules {
                return CandidateRule::always(css);
            }
        }
        CandidateRule::dependent(css, dependency)
    }

    /// An unparsed fragment is kept verbatim. Errors without source text
    /// carry nothing to keep.
    pub fn from_error(error: &SyntaxError) -> Option<CandidateRule> {
        let Some(source) = &error.source else {
            debug!(
                "dropping syntax error without source at {}:{}: {}",
                error.line, error.column, error.message
            );
            return None;
        };
        Some(CandidateRule::always(source.clone()))
    }

    /// Classify a whole stylesheet: every rule in source order, then the
    /// error fragments.
    ///
    /// Fragments go last so a dangling prelude can never merge into the
    /// rule after it. Closed fragments (ending in `}` or `;`) come before
    /// open ones, so at most one open fragment sits at the very end.
    pub fn classify_stylesheet<Backend>(
        &self,
        backend: &Backend,
        sheet: &Stylesheet,
    ) -> Vec<CandidateRule>
    where
        Backend: StylesheetBackend + ?Sized,
    {
        let mut candidates =
            Vec::with_capacity(sheet.rules.len().saturating_add(sheet.errors.len()));
        candidates.extend(sheet.rules.iter().map(|rule| self.classify(backend, rule)));

        let (closed, open): (Vec<CandidateRule>, Vec<CandidateRule>) = sheet
            .errors
            .iter()
            .filter_map(Self::from_error)
            .partition(|fragment| is_closed_fragment(fragment.css()));
        if open.len() > 1 {
            debug!("{} unterminated fragments will run together", open.len());
        }
        candidates.extend(closed);
        candidates.extend(open);
        candidates
    }
}

/// A fragment ending in a block or a semicolon cannot absorb what follows it.
fn is_closed_fragment(source: &str) -> bool {
    source.trim_end().ends_with(['}', ';'])
}
