//! Rule serialization.
//!
//! Compressed output carries no optional whitespace. Pretty output indents
//! blocks by two spaces and puts each selector and declaration on its own
//! line. Removing every whitespace character from either form yields the
//! same text.
use crate::{BlockItem, Declaration, Rule, Stylesheet};

/// Serialize one rule on its own, with no cross-rule state.
pub fn serialize_rule(rule: &Rule, compress: bool) -> String {
    let mut writer = CssWriter::new(compress);
    writer.rule(rule);
    writer.out
}

/// Serialize every top-level rule of a stylesheet, in order.
pub fn serialize_stylesheet(sheet: &Stylesheet, compress: bool) -> String {
    let separator = if compress { "" } else { "\n\n" };
    sheet
        .rules
        .iter()
        .map(|rule| serialize_rule(rule, compress))
        .collect::<Vec<_>>()
        .join(separator)
}

struct CssWriter {
    out: String,
    compress: bool,
    depth: usize,
}

impl CssWriter {
    const fn new(compress: bool) -> Self {
        Self {
            out: String::new(),
            compress,
            depth: 0,
        }
    }

    fn indent(&mut self) {
        if !self.compress {
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
        }
    }

    fn rule(&mut self, rule: &Rule) {
        self.indent();
        match rule {
            Rule::Style(style) => {
                self.selectors(&style.selectors);
                self.open_block();
                for declaration in &style.declarations {
                    self.next_item();
                    self.declaration(declaration);
                }
                self.close_block(!style.declarations.is_empty());
            }
            Rule::Grouping(group) => {
                self.at_keyword(&group.name, &group.prelude);
                self.open_block();
                for nested in &group.rules {
                    self.next_item();
                    self.rule(nested);
                }
                self.close_block(!group.rules.is_empty());
            }
            Rule::At(at_rule) => {
                self.at_keyword(&at_rule.name, &at_rule.prelude);
                let Some(items) = &at_rule.block else {
                    self.out.push(';');
                    return;
                };
                self.open_block();
                for item in items {
                    self.next_item();
                    match item {
                        BlockItem::Declaration(declaration) => self.declaration(declaration),
                        BlockItem::Rule(nested) => self.rule(nested),
                    }
                }
                self.close_block(!items.is_empty());
            }
        }
    }

    fn selectors(&mut self, selectors: &[String]) {
        for (index, selector) in selectors.iter().enumerate() {
            if index > 0 {
                self.out.push(',');
                if !self.compress {
                    self.out.push('\n');
                    self.indent();
                }
            }
            self.out.push_str(selector);
        }
    }

    fn at_keyword(&mut self, name: &str, prelude: &str) {
        self.out.push('@');
        self.out.push_str(name);
        if !prelude.is_empty() {
            self.out.push(' ');
            self.out.push_str(prelude);
        }
    }

    fn open_block(&mut self) {
        if !self.compress {
            self.out.push(' ');
        }
        self.out.push('{');
        self.depth = self.depth.saturating_add(1);
    }

    /// Start a new item inside the current block. Items indent one level deeper.
    fn next_item(&mut self) {
        if !self.compress {
            self.out.push('\n');
        }
    }

    fn close_block(&mut self, had_items: bool) {
        self.depth = self.depth.saturating_sub(1);
        if had_items && !self.compress {
            self.out.push('\n');
            self.indent();
        }
        self.out.push('}');
    }

    fn declaration(&mut self, declaration: &Declaration) {
        self.indent();
        self.out.push_str(&declaration.name);
        self.out.push(':');
        if !self.compress {
            self.out.push(' ');
        }
        self.out.push_str(&declaration.value);
        if declaration.important {
            self.out.push_str(" !important");
        }
        self.out.push(';');
    }
}
