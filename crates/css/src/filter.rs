//! The filter engine: classify once, apply to many documents.

use crate::{
    CandidateRule, Classifier, CssparserBackend, ShakeError, ShakeOptions, StylesheetBackend,
};
use html::ClassScanner;
use log::{debug, trace};
use rayon::prelude::*;

/// A stylesheet prepared for tree-shaking.
///
/// Immutable once built: [`Filter::apply`] takes `&self` and allocates all
/// per-document state, so one filter can serve many threads at once.
#[derive(Clone, Debug)]
pub struct Filter {
    /// Candidates in stylesheet source order.
    candidates: Vec<CandidateRule>,
    scanner: ClassScanner,
    options: ShakeOptions,
}

impl Filter {
    /// Build a filter with default options and the given output mode.
    ///
    /// # Errors
    /// Returns [`ShakeError::NoStylesheetFound`] if `css` yields no stylesheet.
    pub fn build(css: &str, compress: bool) -> Result<Self, ShakeError> {
        Self::with_options(css, ShakeOptions::with_compress(compress))
    }

    /// Build a filter on the default `cssparser` backend.
    ///
    /// # Errors
    /// Returns [`ShakeError::NoStylesheetFound`] if `css` yields no stylesheet.
    pub fn with_options(css: &str, options: ShakeOptions) -> Result<Self, ShakeError> {
        Self::with_backend(&CssparserBackend, css, options)
    }

    /// Build a filter on a custom parser/serializer pair.
    ///
    /// # Errors
    /// Returns [`ShakeError::NoStylesheetFound`] if the backend yields no
    /// stylesheet, or [`ShakeError::Pattern`] if a scanning pattern fails to
    /// compile.
    pub fn with_backend<Backend>(
        backend: &Backend,
        css: &str,
        options: ShakeOptions,
    ) -> Result<Self, ShakeError>
    where
        Backend: StylesheetBackend + ?Sized,
    {
        let sheet = backend.parse(css).ok_or(ShakeError::NoStylesheetFound)?;
        let classifier = Classifier::new(&options)?;
        let candidates = classifier.classify_stylesheet(backend, &sheet);

        let always = candidates
            .iter()
            .filter(|candidate| candidate.is_always_included())
            .count();
        let unreachable = candidates
            .iter()
            .filter(|candidate| candidate.is_unreachable())
            .count();
        debug!(
            "built filter: {} rules, {} syntax errors, {} dropped declarations",
            sheet.rules.len(),
            sheet.errors.len(),
            sheet.declaration_errors.len(),
        );
        debug!(
            "{} candidates: {always} always included, {unreachable} unreachable",
            candidates.len()
        );

        Ok(Self {
            candidates,
            scanner: ClassScanner::new()?,
            options,
        })
    }

    /// Return the CSS of every candidate the document can use, in source order.
    pub fn apply(&self, html: &str) -> String {
        let classes = self.scanner.extract_classes(html);
        let ids = self
            .options
            .match_ids
            .then(|| self.scanner.extract_ids(html));
        let kept: Vec<&str> = self
            .candidates
            .iter()
            .filter(|candidate| candidate.is_retained_by(&classes, ids.as_ref()))
            .map(CandidateRule::css)
            .collect();
        trace!(
            "document with {} classes keeps {} of {} candidates",
            classes.len(),
            kept.len(),
            self.candidates.len()
        );
        kept.join(self.separator())
    }

    /// Filter many documents in parallel. Output order matches input order.
    pub fn apply_batch<Document>(&self, documents: &[Document]) -> Vec<String>
    where
        Document: AsRef<str> + Sync,
    {
        documents
            .par_iter()
            .map(|document| self.apply(document.as_ref()))
            .collect()
    }

    /// The precomputed candidates, in stylesheet order.
    pub fn candidates(&self) -> &[CandidateRule] {
        &self.candidates
    }

    pub const fn options(&self) -> ShakeOptions {
        self.options
    }

    const fn separator(&self) -> &'static str {
        if self.options.compress { "" } else { "\n" }
    }
}
