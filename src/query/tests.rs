//! Declaration query tests.

use proptest::prelude::*;

use super::*;
use crate::error::FailureKind;

fn sheet(css: &str) -> Stylesheet {
    Stylesheet::parse(css).expect("stylesheet should parse")
}

const RESPONSIVE_CSS: &str = r#"
    html { font-size: 16px; }
    header { display: flex; gap: 30px; padding: 20px 40px; }
    nav { font-size: 0.75rem; }
    .hero { height: 100vh; margin-top: 40px; padding: 40px; }
    .hero h1 { font-size: 2rem; }

    @media (max-width: 768px) {
        header { flex-direction: column; gap: 15px; padding: 20px 10px 15px; }
        .hero { height: 70vh; margin-top: 0; padding: 10px; }
        nav a, nav button { width: 25%; text-align: center; }
    }
"#;

#[test]
fn test_default_rule_matches() {
    let stylesheet = sheet(".hero h1 { font-size: 2rem; }");
    let query = DeclarationQuery::new(".hero h1", "font-size").accept("2rem");
    let decl = assert_declaration(&stylesheet, &query).unwrap();
    assert_eq!(decl.value, "2rem");
}

#[test]
fn test_conditional_rule_matches_only_in_conditional_context() {
    let css = "@media (max-width: 768px) { .hero { height: 70vh; } }";
    let query = DeclarationQuery::new(".hero", "height").accept("70vh");

    assert!(assert_declaration_in_source(css, &query.clone().conditional()).is_ok());

    let err = assert_declaration_in_source(css, &query).unwrap_err();
    assert_eq!(err.kind(), FailureKind::SelectorNotFound);
}

#[test]
fn test_property_missing() {
    let query = DeclarationQuery::new("nav", "font-size").accept("0.75rem");
    let err = assert_declaration_in_source("nav { color: red; }", &query).unwrap_err();
    match err {
        Error::PropertyMissing {
            selector,
            property,
            context,
        } => {
            assert_eq!(selector, "nav");
            assert_eq!(property, "font-size");
            assert_eq!(context, Context::Default);
        }
        other => panic!("expected PropertyMissing, got {other:?}"),
    }
}

#[test]
fn test_value_mismatch_reports_actual_and_expected() {
    let query = DeclarationQuery::new(".hero", "padding").accept("10px");
    let err = assert_declaration_in_source(".hero { padding: 12px; }", &query).unwrap_err();
    match &err {
        Error::ValueMismatch {
            actual, expected, ..
        } => {
            assert_eq!(actual, "12px");
            assert_eq!(expected, &vec!["10px".to_string()]);
        }
        other => panic!("expected ValueMismatch, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains(".hero"));
    assert!(message.contains("12px"));
    assert!(message.contains("10px"));
    assert!(message.contains("in default rules"));
}

#[test]
fn test_any_accepted_value_matches() {
    let css = "@media (max-width: 768px) { nav a { width: 25%; } }";
    let query = DeclarationQuery::new("nav a", "width")
        .accepting(["25%", "auto"])
        .conditional();
    let decl = assert_declaration_in_source(css, &query).unwrap();
    assert_eq!(decl.value, "25%");
}

#[test]
fn test_selector_not_found_names_context() {
    let err = assert_declaration_in_source(
        ".hero { height: 100vh; }",
        &DeclarationQuery::new(".hero", "height")
            .accept("70vh")
            .conditional(),
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'.hero'"));
    assert!(message.contains("inside a conditional block"));
}

#[test]
fn test_selector_matching_trims_whitespace() {
    let stylesheet = sheet("  nav a  ,  .x { width: 25%; }");
    let query = DeclarationQuery::new("  nav a ", "width").accept("25%");
    assert!(assert_declaration(&stylesheet, &query).is_ok());
}

#[test]
fn test_selector_matching_is_literal() {
    let stylesheet = sheet(".a.b { color: red; }");
    let query = DeclarationQuery::new(".b.a", "color").accept("red");
    let err = assert_declaration(&stylesheet, &query).unwrap_err();
    assert_eq!(err.kind(), FailureKind::SelectorNotFound);
}

#[test]
fn test_values_are_compared_literally() {
    let stylesheet = sheet("p { margin-top: 0; color: RED; }");
    let zero = DeclarationQuery::new("p", "margin-top").accept("0px");
    assert_eq!(
        assert_declaration(&stylesheet, &zero).unwrap_err().kind(),
        FailureKind::ValueMismatch
    );
    let color = DeclarationQuery::new("p", "color").accept("red");
    assert_eq!(
        assert_declaration(&stylesheet, &color).unwrap_err().kind(),
        FailureKind::ValueMismatch
    );
}

#[test]
fn test_first_rule_declaring_property_wins() {
    let stylesheet = sheet(
        r#"
        .hero { color: red; }
        .hero { padding: 1px; }
        .hero { padding: 2px; }
        "#,
    );
    let found = find_declaration(&stylesheet, ".hero", "padding", Context::Default).unwrap();
    assert_eq!(found.declaration.value, "1px");

    let later = DeclarationQuery::new(".hero", "padding").accept("2px");
    assert_eq!(
        assert_declaration(&stylesheet, &later).unwrap_err().kind(),
        FailureKind::ValueMismatch
    );
}

#[test]
fn test_first_duplicate_declaration_wins() {
    let stylesheet = sheet("nav { font-size: 1rem; font-size: 0.75rem; }");
    let found = find_declaration(&stylesheet, "nav", "font-size", Context::Default).unwrap();
    assert_eq!(found.declaration.value, "1rem");
}

#[test]
fn test_rule_without_property_does_not_shadow_later_rule() {
    let stylesheet = sheet("nav { color: red; } nav { font-size: 0.75rem; }");
    let query = DeclarationQuery::new("nav", "font-size").accept("0.75rem");
    assert!(assert_declaration(&stylesheet, &query).is_ok());
}

#[test]
fn test_property_name_is_case_sensitive() {
    let stylesheet = sheet("nav { Font-Size: 1rem; }");
    let err = find_declaration(&stylesheet, "nav", "font-size", Context::Default).unwrap_err();
    assert_eq!(err.kind(), FailureKind::PropertyMissing);
}

#[test]
fn test_empty_accepted_set_never_matches() {
    let stylesheet = sheet("nav { color: red; }");
    let query = DeclarationQuery::new("nav", "color");
    assert_eq!(
        assert_declaration(&stylesheet, &query).unwrap_err().kind(),
        FailureKind::ValueMismatch
    );
}

#[test]
fn test_parse_error_surfaces() {
    let query = DeclarationQuery::new("nav", "color").accept("red");
    let err = assert_declaration_in_source("nav { color red }", &query).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ParseError);
}

#[test]
fn test_commented_selector_still_matches() {
    let query = DeclarationQuery::new(".hero", "height").accept("70vh");
    assert!(assert_declaration_in_source(".hero /* main */ { height: 70vh; }", &query).is_ok());

    let css = "@media (max-width: 768px) /* phones */ { .hero /* mobile */ { height: 70vh; } }";
    assert!(assert_declaration_in_source(css, &query.conditional()).is_ok());
}

#[test]
fn test_unclosed_block_fails_with_parse_error() {
    let query = DeclarationQuery::new(".hero", "height").accept("70vh");
    let err = assert_declaration_in_source(".hero { height: 70vh;", &query).unwrap_err();
    assert_eq!(err.kind(), FailureKind::ParseError);
}

#[test]
fn test_flatten_tags_conditions() {
    let stylesheet = sheet(RESPONSIVE_CSS);
    let resolved = flatten(&stylesheet.nodes);
    assert_eq!(resolved.len(), 8);
    assert!(resolved[..5].iter().all(|r| r.condition.is_none()));
    assert!(
        resolved[5..]
            .iter()
            .all(|r| r.condition == Some("(max-width: 768px)"))
    );
}

#[test]
fn test_responsive_sheet_in_both_contexts() {
    let stylesheet = sheet(RESPONSIVE_CSS);

    let cases = [
        ("html", "font-size", "16px", Context::Default),
        ("nav", "font-size", "0.75rem", Context::Default),
        (".hero h1", "font-size", "2rem", Context::Default),
        (".hero", "height", "100vh", Context::Default),
        (".hero", "height", "70vh", Context::Conditional),
        ("header", "gap", "15px", Context::Conditional),
        ("header", "padding", "20px 10px 15px", Context::Conditional),
        ("header", "flex-direction", "column", Context::Conditional),
        ("nav button", "text-align", "center", Context::Conditional),
        (".hero", "margin-top", "0", Context::Conditional),
    ];

    for (selector, property, value, context) in cases {
        let query = DeclarationQuery::new(selector, property)
            .accept(value)
            .in_context(context);
        assert!(
            assert_declaration(&stylesheet, &query).is_ok(),
            "{selector} {property}: {value} {context}"
        );
    }

    let column = DeclarationQuery::new("header", "flex-direction").accept("column");
    assert_eq!(
        assert_declaration(&stylesheet, &column).unwrap_err().kind(),
        FailureKind::PropertyMissing
    );
}

#[test]
fn test_context_from_required() {
    assert_eq!(Context::from_required(true), Context::Conditional);
    assert_eq!(Context::from_required(false), Context::Default);
    assert!(Context::Conditional.admits(Some("print")));
    assert!(!Context::Conditional.admits(None));
    assert!(Context::Default.admits(None));
    assert!(!Context::Default.admits(Some("print")));
}

fn selector_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z]{1,6})?".prop_map(|s| format!(".{s}"))
}

proptest! {
    #[test]
    fn prop_unconditioned_rule_found_only_in_default_context(
        selector in selector_strategy(),
        property in "[a-z]{1,6}(-[a-z]{1,6})?",
        value in "[0-9]{1,3}(px|rem|vh|%)",
    ) {
        let css = format!("{selector} {{ {property}: {value}; }}");
        let query = DeclarationQuery::new(selector.clone(), property.clone()).accept(value.clone());

        prop_assert!(assert_declaration_in_source(&css, &query).is_ok());

        let err = assert_declaration_in_source(&css, &query.clone().conditional()).unwrap_err();
        prop_assert_eq!(err.kind(), FailureKind::SelectorNotFound);
    }

    #[test]
    fn prop_conditioned_rule_invisible_to_default_context(
        selector in selector_strategy(),
        width in 100u32..2000,
    ) {
        let css = format!("@media (max-width: {width}px) {{ {selector} {{ color: red; }} }}");
        let query = DeclarationQuery::new(selector, "color").accept("red");

        let err = assert_declaration_in_source(&css, &query).unwrap_err();
        prop_assert_eq!(err.kind(), FailureKind::SelectorNotFound);
        prop_assert!(assert_declaration_in_source(&css, &query.conditional()).is_ok());
    }

    #[test]
    fn prop_absent_property_never_succeeds(
        selector in selector_strategy(),
        property in "[a-z]{3,10}",
        conditional in any::<bool>(),
    ) {
        let stylesheet = sheet(RESPONSIVE_CSS);
        let query = DeclarationQuery::new(selector, format!("x-{property}"))
            .accept("0")
            .in_context(Context::from_required(conditional));
        let kind = assert_declaration(&stylesheet, &query).unwrap_err().kind();
        prop_assert!(matches!(kind, FailureKind::SelectorNotFound | FailureKind::PropertyMissing));
    }

    #[test]
    fn prop_repeated_queries_agree(
        selector in prop_oneof![Just("header"), Just(".hero"), Just("nav"), Just("footer")],
        property in prop_oneof![Just("gap"), Just("height"), Just("font-size")],
        conditional in any::<bool>(),
    ) {
        let query = DeclarationQuery::new(selector, property)
            .accept("15px")
            .in_context(Context::from_required(conditional));
        let first = assert_declaration_in_source(RESPONSIVE_CSS, &query).map_err(|e| e.kind());
        let second = assert_declaration_in_source(RESPONSIVE_CSS, &query).map_err(|e| e.kind());
        prop_assert_eq!(first, second);
    }
}
