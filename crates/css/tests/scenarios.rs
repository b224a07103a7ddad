#![cfg(test)]

use anyhow::Result;
use css_shake::{CssparserBackend, Filter, ShakeError, ShakeOptions, StylesheetBackend, tree_shake};
use css_syntax::{Rule, Stylesheet, SyntaxError, parse_stylesheet};

/// Reports one fixed recoverable error after parsing normally.
struct BrokenFragmentBackend {
    source: Option<&'static str>,
}

impl StylesheetBackend for BrokenFragmentBackend {
    fn parse(&self, css: &str) -> Option<Stylesheet> {
        let mut sheet = parse_stylesheet(css);
        sheet.errors.push(SyntaxError {
            message: "unterminated block".to_owned(),
            source: self.source.map(str::to_owned),
            line: 1,
            column: 1,
            rule_index: sheet.rules.len(),
        });
        Some(sheet)
    }

    fn serialize(&self, rule: &Rule, compress: bool) -> String {
        CssparserBackend.serialize(rule, compress)
    }
}

/// Never produces a stylesheet.
struct NothingBackend;

impl StylesheetBackend for NothingBackend {
    fn parse(&self, _css: &str) -> Option<Stylesheet> {
        None
    }

    fn serialize(&self, _rule: &Rule, _compress: bool) -> String {
        String::new()
    }
}

#[test]
fn only_rules_for_present_classes_are_kept() -> Result<()> {
    let filter = Filter::build(".a{color:red}.b{color:blue}", true)?;
    assert_eq!(filter.apply("<div class='a'></div>"), ".a{color:red;}");
    Ok(())
}

#[test]
fn font_face_survives_documents_without_classes() -> Result<()> {
    let filter = Filter::build("@font-face{font-family:X}", true)?;
    assert_eq!(filter.apply("<p>no classes</p>"), "@font-face{font-family:X;}");
    Ok(())
}

#[test]
fn negated_class_is_not_required() -> Result<()> {
    let filter = Filter::build("div.foo:not(.bar) span{color:red}", true)?;
    assert_eq!(
        filter.apply(r#"<div class="foo"><span></span></div>"#),
        "div.foo:not(.bar) span{color:red;}"
    );
    assert_eq!(filter.apply(r#"<div class="bar"></div>"#), "");
    Ok(())
}

#[test]
fn unparsed_fragments_are_kept_verbatim() -> Result<()> {
    let backend = BrokenFragmentBackend {
        source: Some(".broken{"),
    };
    let filter = Filter::with_backend(&backend, ".a{color:red}", ShakeOptions::default())?;
    assert_eq!(filter.apply("<p></p>"), ".broken{");
    assert_eq!(filter.apply("<p class='a'></p>"), ".a{color:red;}.broken{");
    Ok(())
}

#[test]
fn errors_without_source_are_dropped() -> Result<()> {
    let backend = BrokenFragmentBackend { source: None };
    let filter = Filter::with_backend(&backend, ".a{color:red}", ShakeOptions::default())?;
    assert_eq!(filter.candidates().len(), 1);
    assert_eq!(filter.apply("<p></p>"), "");
    Ok(())
}

#[test]
fn real_parse_errors_follow_the_rules() -> Result<()> {
    let filter = Filter::build(".a{color:red}{color:blue}.b{color:green}", true)?;
    assert_eq!(
        filter.apply("<p class='a b'></p>"),
        ".a{color:red;}.b{color:green;}{color:blue}"
    );
    assert_eq!(filter.apply("<p></p>"), "{color:blue}");
    Ok(())
}

/// Count of top-level rules and of grouping rules after parsing `css`.
fn rule_shape(css: &str) -> (usize, usize) {
    let sheet = parse_stylesheet(css);
    let grouping = sheet
        .rules
        .iter()
        .filter(|rule| matches!(rule, Rule::Grouping(_)))
        .count();
    (sheet.rules.len(), grouping)
}

#[test]
fn dangling_fragments_never_swallow_kept_rules() -> Result<()> {
    let sources = [
        "@media print{.b{color:red} .dangling}",
        "@media print{.b{color:red} .x}.a{color:blue} .tail",
        ".a{color:blue}@media print{.b{color:red} {bad:1} .x}{oops}",
    ];
    for css in sources {
        for compress in [true, false] {
            let filter = Filter::build(css, compress)?;
            let output = filter.apply("<p class='a b'>");
            let kept_rules = filter
                .candidates()
                .iter()
                .filter(|candidate| !candidate.is_always_included())
                .count();
            let (rules, grouping) = rule_shape(&output);
            assert!(rules >= kept_rules, "{output:?} lost rules of {css:?}");
            assert_eq!(grouping, 1, "{output:?} lost the @media block of {css:?}");
            assert!(output.contains(".b{color:red;}") || output.contains(".b {\n    color: red;"));
        }
    }
    Ok(())
}

#[test]
fn leading_charset_is_always_included() -> Result<()> {
    let filter = Filter::build("@charset \"UTF-8\";.a{color:red}", true)?;
    assert_eq!(filter.candidates().len(), 2);
    assert_eq!(filter.apply("<p>"), "@charset \"UTF-8\";");
    assert_eq!(
        filter.apply("<p class='a'>"),
        "@charset \"UTF-8\";.a{color:red;}"
    );
    Ok(())
}

#[test]
fn empty_stylesheet_always_yields_empty_output() -> Result<()> {
    let filter = Filter::build("", true)?;
    assert!(filter.candidates().is_empty());
    assert_eq!(filter.apply("<div class='a'></div>"), "");
    assert_eq!(filter.apply(""), "");
    Ok(())
}

#[test]
fn missing_stylesheet_fails_construction() {
    let result = Filter::with_backend(&NothingBackend, ".a{}", ShakeOptions::default());
    assert!(matches!(result, Err(ShakeError::NoStylesheetFound)));
    let message = result.map(|_| ()).map_err(|err| err.to_string());
    assert_eq!(message, Err("No stylesheet found".to_owned()));
}

#[test]
fn media_rules_depend_on_their_nested_selectors() -> Result<()> {
    let filter = Filter::build("@media print{.a{color:red}.b{color:blue}}.c{}", true)?;
    assert_eq!(
        filter.apply("<i class='b'>"),
        "@media print{.a{color:red;}.b{color:blue;}}"
    );
    assert_eq!(filter.apply("<i class='z'>"), "");
    Ok(())
}

#[test]
fn keyframes_and_imports_are_always_included() -> Result<()> {
    let css = "@import url(base.css);@keyframes spin{to{opacity:1}}.x{}";
    let filter = Filter::build(css, true)?;
    assert_eq!(
        filter.apply("<p>"),
        "@import url(base.css);@keyframes spin{to{opacity:1;}}"
    );
    Ok(())
}

#[test]
fn id_only_rules_need_id_matching() -> Result<()> {
    let css = "#app .x{color:red}";
    let html = "<main id='app'><p class='y'></p></main>";

    let class_only = Filter::build(css, true)?;
    assert_eq!(class_only.apply(html), "");

    let options = ShakeOptions {
        match_ids: true,
        ..ShakeOptions::default()
    };
    let with_ids = Filter::with_options(css, options)?;
    assert_eq!(with_ids.apply(html), "#app .x{color:red;}");
    Ok(())
}

#[test]
fn unanchored_rules_follow_configuration() -> Result<()> {
    let css = "body{margin:0}.a{color:red}";
    let strict = Filter::build(css, true)?;
    assert_eq!(strict.apply("<body class='a'>"), ".a{color:red;}");

    let options = ShakeOptions::from_json(r#"{"keepUnanchoredRules": true}"#)?;
    let lenient = Filter::with_options(css, options)?;
    assert_eq!(lenient.apply("<body>"), "body{margin:0;}");
    Ok(())
}

#[test]
fn pretty_output_joins_rules_with_newlines() -> Result<()> {
    let filter = Filter::build(".a{color:red}.b{color:blue}", false)?;
    assert_eq!(
        filter.apply("<p class='a b'>"),
        ".a {\n  color: red;\n}\n.b {\n  color: blue;\n}"
    );
    Ok(())
}

#[test]
fn matching_function_wraps_a_filter() -> Result<()> {
    let matcher = tree_shake(".a{color:red}.b{color:blue}", true)?;
    assert_eq!(matcher("<b class=\"b\">"), ".b{color:blue;}");
    Ok(())
}
