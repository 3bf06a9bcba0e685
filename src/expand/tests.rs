//! Tests for the template expander.

use super::expand;
use crate::binder::{Bindings, BoundValue, Record};
use crate::document::{Document, Node, SectionKind};
use crate::error::PomlError;
use crate::parser::{ParseOptions, parse};

// =========================================================================
// Helper functions
// =========================================================================

fn doc(markup: &str) -> Document {
    parse(markup, &ParseOptions::default()).unwrap()
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn issues() -> BoundValue {
    BoundValue::Records(vec![
        record(&[("issue", "billing"), ("date", "2024-01-02")]),
        record(&[("issue", "shipping"), ("date", "2024-02-03")]),
    ])
}

fn bindings(pairs: Vec<(&str, BoundValue)>) -> Bindings {
    pairs.into_iter().collect()
}

/// Expand and return the text of the first top-level section.
fn first_text(markup: &str, bindings: &Bindings) -> String {
    let expanded = expand(&doc(markup), bindings).unwrap();
    expanded.sections[0].text()
}

// =========================================================================
// Substitution
// =========================================================================

#[test]
fn test_plain_reference_substitutes_bound_text() {
    let b = bindings(vec![
        ("customer", BoundValue::Scalar("Ada".into())),
        ("notes", BoundValue::Text("Prices are up.".into())),
    ]);
    let text = first_text("<poml><task>Hi {{customer}}. {{notes}}</task></poml>", &b);
    assert_eq!(text, "Hi Ada. Prices are up.");
}

#[test]
fn test_record_field_reference() {
    let b = bindings(vec![("profile", BoundValue::Record(record(&[("name", "Ada")])))]);
    let text = first_text("<poml><task>{{profile.name}}|{{profile.age}}|</task></poml>", &b);
    assert_eq!(text, "Ada||");
}

#[test]
fn test_record_in_plain_reference_renders_json() {
    let b = bindings(vec![("profile", BoundValue::Record(record(&[("name", "Ada")])))]);
    let text = first_text("<poml><task>{{profile}}</task></poml>", &b);
    assert_eq!(text, r#"{"name":"Ada"}"#);
}

#[test]
fn test_escaped_braces_render_literally() {
    let text = first_text(r"<poml><task>use \{{name}} here</task></poml>", &Bindings::new());
    assert_eq!(text, "use {{name}} here");
}

#[test]
fn test_unbound_reference_is_an_error() {
    let err = expand(
        &doc("<poml><task>\n  {{nobody}}</task></poml>"),
        &Bindings::new(),
    )
    .unwrap_err();

    match err {
        PomlError::UnresolvedBinding { name, position } => {
            assert_eq!(name, "nobody");
            assert_eq!(position.line, 2);
            assert_eq!(position.column, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

// =========================================================================
// Iteration
// =========================================================================

#[test]
fn test_each_produces_one_fragment_per_record_in_order() {
    let b = bindings(vec![("hist", issues())]);
    let text = first_text(
        "<poml><task>{{#each hist}}[{{@index}}:{{this.issue}}]{{/each}}</task></poml>",
        &b,
    );
    assert_eq!(text, "[0:billing][1:shipping]");
}

#[test]
fn test_each_with_explicit_alias() {
    let b = bindings(vec![("hist", issues())]);
    let text = first_text(
        "<poml><task>{{#each hist as row}}{{row.date}} {{/each}}</task></poml>",
        &b,
    );
    assert_eq!(text, "2024-01-02 2024-02-03 ");
}

#[test]
fn test_each_over_empty_records_renders_nothing() {
    let b = bindings(vec![("hist", BoundValue::Records(Vec::new()))]);
    let text = first_text("<poml><task>a{{#each hist}}x{{/each}}b</task></poml>", &b);
    assert_eq!(text, "ab");
}

#[test]
fn test_nested_each_inner_alias_shadows_outer() {
    let b = bindings(vec![
        ("outer", BoundValue::Records(vec![record(&[("n", "o1")]), record(&[("n", "o2")])])),
        ("inner", BoundValue::Records(vec![record(&[("n", "i")])])),
    ]);
    let text = first_text(
        "<poml><task>{{#each outer}}{{this.n}}({{#each inner}}{{this.n}}{{@index}}{{/each}}){{/each}}</task></poml>",
        &b,
    );
    assert_eq!(text, "o1(i0)o2(i0)");
}

#[test]
fn test_each_over_alias_of_outer_loop_is_invalid_target() {
    let b = bindings(vec![("hist", issues())]);
    let err = expand(
        &doc("<poml><task>{{#each hist as row}}{{#each row}}x{{/each}}{{/each}}</task></poml>"),
        &b,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PomlError::InvalidIterationTarget { ref name, found: "a record", .. } if name == "row"
    ));
}

#[test]
fn test_each_over_non_records_is_invalid_target() {
    let cases = [
        (BoundValue::Text("plain".into()), "a text blob"),
        (BoundValue::Scalar("1".into()), "a scalar"),
        (BoundValue::Record(record(&[("a", "b")])), "a record"),
    ];

    for (value, expected) in cases {
        let b = bindings(vec![("v", value)]);
        let err = expand(&doc("<poml><task>{{#each v}}x{{/each}}</task></poml>"), &b).unwrap_err();
        match err {
            PomlError::InvalidIterationTarget { name, found, .. } => {
                assert_eq!(name, "v");
                assert_eq!(found, expected);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[test]
fn test_each_over_unbound_name_is_unresolved() {
    let err = expand(
        &doc("<poml><task>{{#each ghost}}x{{/each}}</task></poml>"),
        &Bindings::new(),
    )
    .unwrap_err();
    assert!(matches!(err, PomlError::UnresolvedBinding { ref name, .. } if name == "ghost"));
}

#[test]
fn test_each_enclosing_child_section_duplicates_it() {
    let b = bindings(vec![("hist", issues())]);
    let expanded = expand(
        &doc("<poml><examples>{{#each hist}}<example>{{this.issue}}</example>{{/each}}</examples></poml>"),
        &b,
    )
    .unwrap();

    let children: Vec<_> = expanded.sections[0].children().collect();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.kind == SectionKind::Example));
    assert_eq!(children[0].text(), "billing");
    assert_eq!(children[1].text(), "shipping");
}

// =========================================================================
// Conditionals
// =========================================================================

#[test]
fn test_if_else_on_empty_and_non_empty_text() {
    let template = "<poml><task>{{#if notes}}has notes{{else}}no notes{{/if}}</task></poml>";

    let full = bindings(vec![("notes", BoundValue::Text("x".into()))]);
    assert_eq!(first_text(template, &full), "has notes");

    let empty = bindings(vec![("notes", BoundValue::Text(String::new()))]);
    assert_eq!(first_text(template, &empty), "no notes");
}

#[test]
fn test_if_on_unbound_name_is_false() {
    let text = first_text(
        "<poml><task>a{{#if ghost}}hidden{{/if}}b</task></poml>",
        &Bindings::new(),
    );
    assert_eq!(text, "ab");
}

#[test]
fn test_if_inside_each_tests_record_fields() {
    let b = bindings(vec![(
        "rows",
        BoundValue::Records(vec![
            record(&[("flag", "yes"), ("v", "1")]),
            record(&[("flag", ""), ("v", "2")]),
        ]),
    )]);
    let text = first_text(
        "<poml><task>{{#each rows}}{{#if this.flag}}{{this.v}}{{else}}-{{/if}}{{/each}}</task></poml>",
        &b,
    );
    assert_eq!(text, "1-");
}

// =========================================================================
// Tree properties
// =========================================================================

#[test]
fn test_expanded_text_has_no_expressions_and_input_is_unchanged() {
    let b = bindings(vec![("hist", issues())]);
    let input = doc("<poml><role>Agent</role><task>{{#each hist}}{{this.issue}}{{/each}}</task></poml>");
    let before = input.clone();

    let expanded = expand(&input, &b).unwrap();

    assert_eq!(input, before);
    assert!(input.has_expressions());
    assert!(!expanded.has_expressions());
    assert_eq!(expanded.sections.len(), 2);
    assert_eq!(expanded.sections[0].text(), "Agent");
}

#[test]
fn test_nested_sections_keep_their_place_in_text() {
    let b = bindings(vec![("who", BoundValue::Scalar("Ada".into()))]);
    let expanded = expand(
        &doc(r#"<poml><task>before {{who}} <data src="x.txt" format="text"/> after</task></poml>"#),
        &b,
    )
    .unwrap();

    let content = &expanded.sections[0].content;
    assert_eq!(content.len(), 3);
    assert!(matches!(&content[0], Node::Text(t) if t.raw == "before Ada "));
    assert!(matches!(&content[1], Node::Section(s) if s.kind == SectionKind::DataSource));
    assert!(matches!(&content[2], Node::Text(t) if t.raw == " after"));
}
