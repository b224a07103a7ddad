//! Selectors Level 3: class and id dependency analysis.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! This module does not match selectors against elements. It only answers
//! "which class or id names must exist in a document for this selector to
//! possibly match", erring on the side of keeping rules:
//! - Class selectors (Section 6) and id selectors (Section 7) are collected
//! - Negations (Section 6.6.7) never contribute dependencies
//! - Combinators are not evaluated

mod analyzer;
mod dependency;

// Re-export public API
pub use analyzer::SelectorAnalyzer;
pub use dependency::SelectorDependency;
