//! CSS tree-shaking for a single HTML document.
//!
//! A stylesheet is parsed and classified once into a [`Filter`]. Each call to
//! [`Filter::apply`] scans one HTML document for class tokens and returns only
//! the rules whose selectors could match something in it. The analysis is
//! textual and conservative: a rule is dropped only when none of the class
//! names its selectors depend on appear in the document.
//!
//! ```
//! let filter = css_shake::Filter::build(".a{color:red}.b{color:blue}", true)?;
//! assert_eq!(filter.apply("<div class='a'></div>"), ".a{color:red;}");
//! # Ok::<(), css_shake::ShakeError>(())
//! ```

mod backend;
mod candidate;
mod error;
mod filter;
mod options;

pub use backend::{CssparserBackend, StylesheetBackend};
pub use candidate::{CandidateRule, Classifier, rule_selectors};
pub use error::ShakeError;
pub use filter::Filter;
pub use options::ShakeOptions;

/// Build a filter and hand back the per-document matching function.
///
/// # Errors
/// Returns [`ShakeError::NoStylesheetFound`] if `css` yields no stylesheet.
pub fn tree_shake(
    css: &str,
    compress: bool,
) -> Result<impl Fn(&str) -> String + Send + Sync, ShakeError> {
    let filter = Filter::build(css, compress)?;
    Ok(move |html: &str| filter.apply(html))
}
