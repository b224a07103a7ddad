//! Textual scanning of HTML documents for class and id attribute tokens.
//!
//! No tree is built. Only the presence of a token anywhere in the document
//! matters, so a pattern scan over the raw text is enough and tolerates
//! malformed or partial markup.

mod scan;

pub use scan::{ClassScanner, TokenSet};
