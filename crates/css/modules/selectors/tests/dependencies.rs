#![cfg(test)]

use css_selectors::{SelectorAnalyzer, SelectorDependency};

fn classes(dependency: &SelectorDependency) -> Vec<&str> {
    dependency.classes().collect()
}

fn ids(dependency: &SelectorDependency) -> Vec<&str> {
    dependency.ids().collect()
}

#[test]
fn single_class_is_its_own_anchor() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    let dependency = analyzer.analyze(".foo");
    assert_eq!(classes(&dependency), vec!["foo"]);
    assert!(ids(&dependency).is_empty());
    Ok(())
}

#[test]
fn first_anchor_gates_descendants() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    assert_eq!(classes(&analyzer.analyze("div.foo .bar")), vec!["foo"]);
    assert_eq!(classes(&analyzer.analyze("html body .main > .item")), vec!["main"]);
    assert_eq!(classes(&analyzer.analyze("DIV .Upper")), vec!["Upper"]);
    Ok(())
}

#[test]
fn leading_id_anchor_records_only_the_id() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    let dependency = analyzer.analyze("#bar .baz");
    assert_eq!(ids(&dependency), vec!["bar"]);
    assert!(classes(&dependency).is_empty());
    Ok(())
}

#[test]
fn general_path_collects_every_token() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    let dependency = analyzer.analyze("a:hover .x > #y ~ .z");
    assert_eq!(classes(&dependency), vec!["x", "z"]);
    assert_eq!(ids(&dependency), vec!["y"]);
    Ok(())
}

#[test]
fn negated_tokens_are_not_dependencies() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    let dependency = analyzer.analyze(":not(.hidden) .shown");
    assert_eq!(classes(&dependency), vec!["shown"]);

    let anchored = analyzer.analyze("div.foo:not(.bar) span");
    assert_eq!(classes(&anchored), vec!["foo"]);
    Ok(())
}

#[test]
fn selectors_without_hooks_are_empty() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    assert!(analyzer.analyze("div > p").is_empty());
    assert!(analyzer.analyze("*").is_empty());
    assert!(analyzer.analyze("").is_empty());
    assert!(analyzer.analyze(":not(.a)").is_empty());
    Ok(())
}

#[test]
fn escaped_and_non_ascii_names_stay_whole() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    assert_eq!(classes(&analyzer.analyze(r".sm\:p-4")), vec!["sm:p-4"]);
    assert_eq!(classes(&analyzer.analyze(".café")), vec!["café"]);
    assert_eq!(classes(&analyzer.analyze(r"[data-x] .w-1\/2")), vec!["w-1/2"]);
    Ok(())
}

#[test]
fn malformed_selectors_degrade_to_a_scan() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    let dependency = analyzer.analyze("]]{.a(((#b");
    assert_eq!(classes(&dependency), vec!["a"]);
    assert_eq!(ids(&dependency), vec!["b"]);
    Ok(())
}

#[test]
fn selector_lists_merge_into_one_dependency() -> Result<(), regex::Error> {
    let analyzer = SelectorAnalyzer::new()?;
    let dependency = analyzer.analyze_all([".a .b", "#c", "p > .d", "div > p"]);
    assert_eq!(classes(&dependency), vec!["a", "d"]);
    assert_eq!(ids(&dependency), vec!["c"]);
    assert!(dependency.has_class("a"));
    assert!(!dependency.has_class("b"));
    assert!(dependency.has_id("c"));
    Ok(())
}
