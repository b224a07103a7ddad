//! CSS Syntax Module Level 3: parsing and serialization of rule trees.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Parsing is "silent": malformed input never fails the whole stylesheet.
//! Each rule that cannot be parsed is reported as a [`SyntaxError`] that
//! keeps the offending source text, and parsing resumes after it.
use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::Delimiter;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;
use cssparser::StyleSheetParser;
use cssparser::Token;
use log::trace;

mod serialize;
mod text;

pub use serialize::{serialize_rule, serialize_stylesheet};
pub use text::normalize;

/// At-rules whose block is a list of rules (conditional group rules and friends).
const GROUPING_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "container",
    "document",
    "-moz-document",
    "layer",
    "scope",
    "starting-style",
];

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, lowercased unless it is a custom property.
    pub name: String,
    /// Normalized value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

/// A single style rule: a selector list and its declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Individual selectors of the prelude, split on top-level commas.
    pub selectors: Vec<String>,
    /// Declarations within the rule block.
    pub declarations: Vec<Declaration>,
}

/// An at-rule whose block holds nested rules, e.g. `@media screen { ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupingRule {
    /// Lowercased at-keyword without the `@`.
    pub name: String,
    /// Normalized prelude text (the media query, supports condition, ...).
    pub prelude: String,
    /// Nested rules in source order.
    pub rules: Vec<Rule>,
}

/// Any other at-rule: `@font-face`, `@keyframes`, `@import`, `@page`, ...
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AtRule {
    /// Lowercased at-keyword without the `@`.
    pub name: String,
    /// Normalized prelude text.
    pub prelude: String,
    /// Block contents, or `None` for statement at-rules ending in `;`.
    pub block: Option<Vec<BlockItem>>,
}

/// One entry inside a generic at-rule block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockItem {
    /// A declaration, e.g. `font-family: X` inside `@font-face`.
    Declaration(Declaration),
    /// A nested block, e.g. `from { ... }` inside `@keyframes`.
    Rule(Rule),
}

/// A parsed rule, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// A qualified rule with a selector prelude.
    Style(StyleRule),
    /// An at-rule wrapping nested rules.
    Grouping(GroupingRule),
    /// Any other at-rule.
    At(AtRule),
}

/// A recoverable parse error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    /// Human readable reason.
    pub message: String,
    /// The raw offending source text, if any non-blank text was consumed.
    pub source: Option<String>,
    /// 1-based line of the error.
    pub line: u32,
    /// 1-based column of the error.
    pub column: u32,
    /// Number of top-level rules parsed before this error.
    pub rule_index: usize,
}

impl SyntaxError {
    fn new(error: &ParseError<'_, ()>, slice: &str, rule_index: usize) -> Self {
        let kind = &error.kind;
        Self {
            message: format!("{kind:?}"),
            source: (!slice.trim().is_empty()).then(|| slice.to_owned()),
            line: error.location.line.saturating_add(1),
            column: error.location.column,
            rule_index,
        }
    }
}

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<Rule>,
    /// Recoverable rule-level errors in source order.
    pub errors: Vec<SyntaxError>,
    /// Invalid declarations and block items, dropped from their rule the
    /// way a browser ignores them.
    pub declaration_errors: Vec<SyntaxError>,
}

impl Rule {
    /// Selectors of a style rule, `None` for at-rules.
    pub fn selectors(&self) -> Option<&[String]> {
        match self {
            Self::Style(style) => Some(&style.selectors),
            Self::Grouping(_) | Self::At(_) => None,
        }
    }
}

/// Parse `!important` at the end of a value.
///
/// Returns the normalized value without the flag, and whether it was set.
fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(pos) = trimmed.rfind("!important")
        && let Some(prefix) = trimmed.get(..pos)
        && trimmed.get(pos..).is_some_and(|tail| tail == "!important")
    {
        let head = prefix.trim_end();
        return (normalize(head), true);
    }
    (normalize(trimmed), false)
}

/// Build a declaration from its name and the remaining value tokens.
fn parse_declaration<'input>(
    name: &CowRcStr<'input>,
    input: &mut Parser<'input, '_>,
) -> Declaration {
    let start = input.position();
    // Consume until end of the declaration item.
    while input.next_including_whitespace_and_comments().is_ok() {}
    let raw = input.slice_from(start);
    let (value, important) = split_important_tail(raw);
    let name = if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    };
    Declaration {
        name,
        value,
        important,
    }
}

/// Split a selector prelude on top-level commas.
///
/// Function arguments and bracketed blocks arrive as single tokens from
/// `cssparser`, so commas inside `:is(.a, .b)` or `[title="a,b"]` never split.
fn parse_selector_list(input: &mut Parser<'_, '_>) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut segment = input.position();
    loop {
        let before = input.position();
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        if token == Token::Comma {
            push_selector(&mut selectors, input.slice(segment..before));
            segment = input.position();
        }
    }
    push_selector(&mut selectors, input.slice_from(segment));
    selectors
}

fn push_selector(selectors: &mut Vec<String>, raw: &str) {
    let selector = normalize(raw);
    if !selector.is_empty() {
        selectors.push(selector);
    }
}

/// Consume the rest of a prelude and return it normalized.
fn parse_raw_prelude(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    normalize(input.slice_from(start))
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl<'input> CssDeclarationParser<'input> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        Ok(parse_declaration(&name, input))
    }
}

impl<'input> CssAtRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        _name: CowRcStr<'input>,
        _input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(())
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        // Not produced by this parser
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl<'input> CssQualifiedRuleParser<'input> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse declarations from a rule block using `cssparser` body parser.
///
/// Invalid declarations are skipped and recorded in `errors`.
fn parse_declarations_from_block(
    block: &mut Parser,
    errors: &mut Vec<SyntaxError>,
    rule_index: usize,
) -> Vec<Declaration> {
    let mut body = BodyDeclParser;
    let mut declarations = Vec::new();
    for result in CssRuleBodyParser::new(block, &mut body) {
        match result {
            Ok(declaration) => declarations.push(declaration),
            Err((error, slice)) => errors.push(SyntaxError::new(&error, slice, rule_index)),
        }
    }
    declarations
}

/// Prelude of an at-rule, classified by the shape of its block.
enum AtPrelude {
    /// The block is a rule list.
    Grouping { name: String, prelude: String },
    /// The block (if any) holds declarations and nested blocks.
    Other { name: String, prelude: String },
}

impl AtPrelude {
    fn new(name: &str, input: &mut Parser<'_, '_>) -> Self {
        let name = name.to_ascii_lowercase();
        let prelude = parse_raw_prelude(input);
        if GROUPING_AT_RULES.contains(&name.as_str()) {
            Self::Grouping { name, prelude }
        } else {
            Self::Other { name, prelude }
        }
    }
}

/// Parser for the block of a generic at-rule (`@font-face`, `@keyframes`, `@page`).
///
/// Declarations and nested blocks may be mixed; invalid items are skipped.
struct AtBlockParser<'errors> {
    errors: &'errors mut Vec<SyntaxError>,
    rule_index: usize,
}

impl<'input> CssDeclarationParser<'input> for AtBlockParser<'_> {
    type Declaration = BlockItem;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        Ok(BlockItem::Declaration(parse_declaration(&name, input)))
    }
}

impl<'input> CssAtRuleParser<'input> for AtBlockParser<'_> {
    type Prelude = (String, String);
    type AtRule = BlockItem;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok((name.to_ascii_lowercase(), parse_raw_prelude(input)))
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let (name, text) = prelude;
        Ok(BlockItem::Rule(Rule::At(AtRule {
            name,
            prelude: text,
            block: Some(parse_at_block(input, self.errors, self.rule_index)),
        })))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        let (name, text) = prelude;
        Ok(BlockItem::Rule(Rule::At(AtRule {
            name,
            prelude: text,
            block: None,
        })))
    }
}

impl<'input> CssQualifiedRuleParser<'input> for AtBlockParser<'_> {
    type Prelude = Vec<String>;
    type QualifiedRule = BlockItem;
    type Error = ();

    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(parse_selector_list(input))
    }

    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Ok(BlockItem::Rule(Rule::Style(StyleRule {
            selectors: prelude,
            declarations: parse_declarations_from_block(input, self.errors, self.rule_index),
        })))
    }
}

impl CssRuleBodyItemParser<'_, BlockItem, ()> for AtBlockParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        true
    }
}

/// Parse the items of a generic at-rule block.
fn parse_at_block(
    block: &mut Parser,
    errors: &mut Vec<SyntaxError>,
    rule_index: usize,
) -> Vec<BlockItem> {
    let mut body = AtBlockParser { errors, rule_index };
    let mut items = Vec::new();
    let mut failures = Vec::new();
    for result in CssRuleBodyParser::new(block, &mut body) {
        match result {
            Ok(item) => items.push(item),
            Err((error, slice)) => failures.push(SyntaxError::new(&error, slice, rule_index)),
        }
    }
    body.errors.extend(failures);
    items
}

/// Top-level parser that builds [`Rule`] items and collects nested errors.
#[derive(Default)]
struct TopLevelParser {
    /// Errors found inside grouping blocks.
    nested_errors: Vec<SyntaxError>,
    /// Invalid declarations and block items.
    declaration_errors: Vec<SyntaxError>,
    /// Completed top-level rules so far.
    rule_count: usize,
    /// Grouping block nesting depth.
    depth: usize,
}

impl TopLevelParser {
    /// Count a completed rule if it sits at the top level.
    fn finish_rule(&mut self, rule: Rule) -> Rule {
        if self.depth == 0 {
            self.rule_count = self.rule_count.saturating_add(1);
        }
        rule
    }

    /// Parse the rule list of a grouping block, recording errors as we go.
    fn parse_rule_list(&mut self, input: &mut Parser) -> Vec<Rule> {
        self.depth = self.depth.saturating_add(1);
        let results: Vec<Result<Rule, SyntaxError>> = StyleSheetParser::new(input, &mut *self)
            .map(|result| {
                result.map_err(|(error, slice)| SyntaxError::new(&error, slice, 0))
            })
            .collect();
        self.depth = self.depth.saturating_sub(1);

        let mut rules = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(rule) => rules.push(rule),
                Err(mut error) => {
                    trace!("nested syntax error: {}", error.message);
                    error.rule_index = self.rule_count;
                    self.nested_errors.push(error);
                }
            }
        }
        rules
    }
}

impl<'input> CssAtRuleParser<'input> for TopLevelParser {
    type Prelude = AtPrelude;
    type AtRule = Rule;
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(AtPrelude::new(&name, input))
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        let rule = match prelude {
            AtPrelude::Grouping { name, prelude } => Rule::Grouping(GroupingRule {
                name,
                prelude,
                rules: self.parse_rule_list(input),
            }),
            AtPrelude::Other { name, prelude } => Rule::At(AtRule {
                name,
                prelude,
                block: Some(parse_at_block(
                    input,
                    &mut self.declaration_errors,
                    self.rule_count,
                )),
            }),
        };
        Ok(self.finish_rule(rule))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        let (name, prelude) = match prelude {
            // `@layer a, b;` is a statement; every other grouping rule needs a block.
            AtPrelude::Grouping { name, prelude } if name == "layer" => (name, prelude),
            AtPrelude::Grouping { .. } => return Err(()),
            AtPrelude::Other { name, prelude } => (name, prelude),
        };
        Ok(self.finish_rule(Rule::At(AtRule {
            name,
            prelude,
            block: None,
        })))
    }
}

impl<'input> CssQualifiedRuleParser<'input> for TopLevelParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Rule;
    type Error = ();

    #[inline]
    fn parse_prelude<'tokens>(
        &mut self,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(parse_selector_list(input))
    }

    #[inline]
    fn parse_block<'tokens>(
        &mut self,
        prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, 'tokens>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        if prelude.is_empty() {
            // Reject only after the block is consumed so the error covers the whole rule.
            while input.next_including_whitespace_and_comments().is_ok() {}
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        let declarations =
            parse_declarations_from_block(input, &mut self.declaration_errors, self.rule_count);
        Ok(self.finish_rule(Rule::Style(StyleRule {
            selectors: prelude,
            declarations,
        })))
    }
}

/// Take a leading `@charset "...";` as a statement rule.
///
/// `StyleSheetParser` discards it silently, but it still belongs in the output.
fn parse_leading_charset(parser: &mut Parser<'_, '_>) -> Option<Rule> {
    parser.skip_whitespace();
    let start = parser.state();
    let is_charset = matches!(
        parser.next(),
        Ok(Token::AtKeyword(name)) if name.eq_ignore_ascii_case("charset")
    );
    if !is_charset {
        parser.reset(&start);
        return None;
    }
    let prelude = parser
        .parse_until_after(Delimiter::Semicolon, |input| {
            Ok::<_, ParseError<'_, ()>>(parse_raw_prelude(input))
        })
        .unwrap_or_default();
    Some(Rule::At(AtRule {
        name: "charset".to_owned(),
        prelude,
        block: None,
    }))
}

/// Parse a full stylesheet into a [`Stylesheet`] using cssparser.
///
/// Never fails: rules that cannot be parsed are reported in
/// [`Stylesheet::errors`] with their source text.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut sheet = Stylesheet::default();
    sheet.rules.extend(parse_leading_charset(&mut parser));
    let mut top = TopLevelParser {
        rule_count: sheet.rules.len(),
        ..TopLevelParser::default()
    };
    let mut top_level_errors = Vec::new();
    for result in StyleSheetParser::new(&mut parser, &mut top) {
        match result {
            Ok(rule) => sheet.rules.push(rule),
            Err((error, slice)) => {
                top_level_errors.push(SyntaxError::new(&error, slice, sheet.rules.len()));
            }
        }
    }
    sheet.errors = top.nested_errors;
    sheet.errors.extend(top_level_errors);
    sheet.declaration_errors = top.declaration_errors;
    sheet
        .errors
        .sort_by_key(|error| (error.rule_index, error.line, error.column));
    trace!(
        "parsed stylesheet: {} rules, {} errors, {} dropped declarations",
        sheet.rules.len(),
        sheet.errors.len(),
        sheet.declaration_errors.len()
    );
    sheet
}
