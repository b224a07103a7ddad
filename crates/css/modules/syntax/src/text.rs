//! Raw source text clean-up shared by preludes and declaration values.

/// Strip `/* ... */` comments and collapse whitespace runs to a single space.
///
/// Quoted strings are copied verbatim, including escaped quotes, so that
/// values like `content: "a  b"` keep their exact contents.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut pending_space = false;
    while let Some(current) = chars.next() {
        match current {
            '"' | '\'' => {
                flush_space(&mut out, &mut pending_space);
                out.push(current);
                copy_string(&mut out, &mut chars, current);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                skip_comment(&mut chars);
                pending_space = pending_space || !out.is_empty();
            }
            _ if current.is_whitespace() => {
                pending_space = !out.is_empty();
            }
            _ => {
                flush_space(&mut out, &mut pending_space);
                out.push(current);
            }
        }
    }
    out
}

/// Emit a single collapsed space if one is owed.
fn flush_space(out: &mut String, pending_space: &mut bool) {
    if *pending_space {
        out.push(' ');
        *pending_space = false;
    }
}

/// Copy the remainder of a quoted string, up to and including the closing quote.
fn copy_string<I>(out: &mut String, chars: &mut I, quote: char)
where
    I: Iterator<Item = char>,
{
    let mut escaped = false;
    for current in chars.by_ref() {
        out.push(current);
        if escaped {
            escaped = false;
        } else if current == '\\' {
            escaped = true;
        } else if current == quote {
            return;
        }
    }
}

/// Skip past the end of a comment body. An unterminated comment runs to end of input.
fn skip_comment<I>(chars: &mut I)
where
    I: Iterator<Item = char>,
{
    let mut star = false;
    for current in chars.by_ref() {
        if star && current == '/' {
            return;
        }
        star = current == '*';
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;

    /// Whitespace runs collapse and the ends are trimmed.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  div\n\t  .foo  "), "div .foo");
    }

    /// Comments disappear but still separate tokens.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn strips_comments() {
        assert_eq!(normalize("div/* hi */.foo"), "div .foo");
        assert_eq!(normalize("/* lead */ .a"), ".a");
        assert_eq!(normalize(".a /* never closed"), ".a");
    }

    /// Quoted text is left alone.
    ///
    /// # Panics
    /// Panics if assertions fail.
    #[test]
    fn preserves_strings() {
        assert_eq!(normalize(r#"  "a  /* b */"   x"#), r#""a  /* b */" x"#);
        assert_eq!(normalize(r"'it\'s  ok'"), r"'it\'s  ok'");
    }
}
