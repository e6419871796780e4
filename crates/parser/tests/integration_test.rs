//! Integration tests for parsing and re-serializing substitution fixtures.
//!
//! Every fixture is written in canonical form, so parsing and serializing
//! it must give back the same text, and parsing that text again must give
//! back the same tree.

use blueprint_substitutions_parser::{
    parse_substitution_values, serialize_substitutions, ParseOptions, SourcePosition,
    StringOrSubstitution, Substitution,
};
use pretty_assertions::assert_eq;

/// Helper macro to generate a round trip test for each fixture file.
macro_rules! fixture_test {
    ($test_name:ident, $path:expr) => {
        #[test]
        fn $test_name() {
            let source = include_str!($path);
            let options = ParseOptions::default().with_context($path);
            let parsed = match parse_substitution_values(source, &options) {
                Ok(parsed) => parsed,
                Err(err) => panic!("Failed to parse {}:\n{}", $path, err),
            };
            let serialized = serialize_substitutions(&parsed, Some($path))
                .unwrap_or_else(|err| panic!("Failed to serialize {}:\n{}", $path, err));
            assert_eq!(serialized, source);

            let reparsed = parse_substitution_values(&serialized, &options).unwrap();
            assert_eq!(reparsed, parsed);
        }
    };
}

fixture_test!(fixture_table_name, "fixtures/table_name.subs");
fixture_test!(fixture_resource_arn, "fixtures/resource_arn.subs");
fixture_test!(fixture_template_index, "fixtures/template_index.subs");
fixture_test!(fixture_data_source, "fixtures/data_source.subs");
fixture_test!(fixture_child_export, "fixtures/child_export.subs");
fixture_test!(fixture_higher_order, "fixtures/higher_order.subs");
fixture_test!(fixture_object, "fixtures/object.subs");
fixture_test!(fixture_bracket_names, "fixtures/bracket_names.subs");
fixture_test!(fixture_each_template, "fixtures/each_template.subs");
fixture_test!(fixture_multiline, "fixtures/multiline.subs");

#[test]
fn test_non_canonical_input_is_normalised() {
    let cases = [
        ("${ordersTable.spec.id}", "${resources.ordersTable.spec.id}"),
        ("${variables[\"env\"]}", "${variables.env}"),
        ("${join( values.parts ,\",\" )}", "${join(values.parts, \",\")}"),
        ("${resources.orders.spec.items[]}", "${resources.orders.spec.items[0]}"),
        ("${elem.i}", "${i}"),
    ];
    for (input, expected) in cases {
        let parsed = parse_substitution_values(input, &ParseOptions::default()).unwrap();
        assert_eq!(serialize_substitutions(&parsed, None).unwrap(), expected);
    }
}

#[test]
fn test_multiline_positions() {
    let source = include_str!("fixtures/multiline.subs");
    let options = ParseOptions::default()
        .with_parent_position(SourcePosition::new(10, 5))
        .with_line_info(true);
    let parsed = parse_substitution_values(source, &options).unwrap();

    let positions: Vec<_> = parsed
        .values
        .iter()
        .filter_map(|part| match part {
            StringOrSubstitution::Substitution { value, source_meta } => Some((
                value.kind_name(),
                source_meta.map(|m| m.position),
                value.source_meta().map(|m| m.position),
            )),
            StringOrSubstitution::String { .. } => None,
        })
        .collect();

    assert_eq!(
        positions,
        vec![
            (
                "function call",
                Some(SourcePosition::new(10, 12)),
                Some(SourcePosition::new(10, 14)),
            ),
            (
                "function call",
                Some(SourcePosition::new(11, 13)),
                Some(SourcePosition::new(11, 15)),
            ),
        ]
    );
}

#[test]
fn test_all_errors_are_reported() {
    let options = ParseOptions::default().with_context("spec.name");
    let err = parse_substitution_values("${variables.}-${trim(}-${values.ok}-${\"open", &options)
        .unwrap_err();
    let diagnostics = err.diagnostics();
    assert!(diagnostics.len() >= 3, "{:#?}", diagnostics);
    assert!(err.to_string().contains("\"spec.name\""));
}

#[test]
fn test_json_output() {
    let parsed =
        parse_substitution_values("${variables.env}", &ParseOptions::default()).unwrap();
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(
        json["values"][0]["substitution"]["value"]["variable"]["variable_name"],
        "env"
    );
    let back: blueprint_substitutions_parser::StringOrSubstitutions =
        serde_json::from_value(json).unwrap();
    assert_eq!(back.substitutions().next(), Some(&Substitution::variable("env")));
}
