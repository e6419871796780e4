//! Serializer - convert substitution trees back to text.
//!
//! The inverse of the parser. Output is canonical rather than a copy of
//! the original text:
//! - Names use dotted notation when they lex back as an identifier and
//!   bracket notation (`["name.v1"]`) otherwise
//! - Resources are always written with the `resources.` prefix
//! - Function arguments are separated by `", "` and named arguments are
//!   written as `name = value`
//! - String literals are double quoted with `"` escaped; a literal ending
//!   in `\` cannot be written back and is an error
//! - Floats always contain a decimal point
//!
//! # Example
//!
//! ```rust
//! use blueprint_substitutions_parser::{parse_substitution_values, serialize_substitutions, ParseOptions};
//!
//! let parsed = parse_substitution_values(
//!     "table-${ordersTable.spec[\"name\"]}",
//!     &ParseOptions::default(),
//! )
//! .unwrap();
//! let text = serialize_substitutions(&parsed, None).unwrap();
//! assert_eq!(text, "table-${resources.ordersTable.spec.name}");
//! ```

use crate::ast::*;
use crate::error::{ErrorStage, SerializeError, SubstitutionError};
use crate::names::{is_identifier, is_name_string};

/// Render an interpolated string, wrapping substitutions in `${...}`.
///
/// `context` names the field being rendered and is included in the error
/// when any substitution fails.
pub fn serialize_substitutions(
    value: &StringOrSubstitutions,
    context: Option<&str>,
) -> Result<String, SubstitutionError> {
    let mut output = String::new();
    let mut errors = Vec::new();

    for part in &value.values {
        match part {
            StringOrSubstitution::String { value, .. } => output.push_str(value),
            StringOrSubstitution::Substitution { value, .. } => match serialize_substitution(value) {
                Ok(text) => {
                    output.push_str("${");
                    output.push_str(&text);
                    output.push('}');
                }
                Err(err) => errors.push(err),
            },
        }
    }

    if errors.is_empty() {
        return Ok(output);
    }
    let message = match context {
        Some(context) => format!("failed to serialise substitutions for \"{}\"", context),
        None => "failed to serialise substitutions".to_string(),
    };
    Err(SubstitutionError::Multiple {
        stage: ErrorStage::Serialize,
        message,
        errors,
    })
}

/// Render one substitution without the surrounding `${` and `}`.
pub fn serialize_substitution(substitution: &Substitution) -> Result<String, SubstitutionError> {
    match substitution {
        Substitution::Function(call) => serialize_function(call),
        Substitution::Variable(variable) => {
            let name = name_accessor("variable", &variable.variable_name)?;
            Ok(format!("variables{}", name))
        }
        Substitution::ValueReference(value) => reference_with_path(
            "value",
            &value.value_name,
            "values",
            None,
            &value.path,
        ),
        Substitution::ElemReference(elem) => {
            Ok(render_path("elem", "elem".to_string(), &elem.path)?)
        }
        Substitution::ElemIndexReference(_) => Ok("i".to_string()),
        Substitution::DataSourceProperty(prop) => serialize_data_source(prop),
        Substitution::ResourceProperty(resource) => reference_with_path(
            "resource",
            &resource.resource_name,
            "resources",
            resource.each_template_index,
            &resource.path,
        ),
        Substitution::Child(child) => {
            if child.path.is_empty() {
                return Err(SerializeError::EmptyChildPath {
                    child_name: child.child_name.clone(),
                }
                .into());
            }
            reference_with_path("child", &child.child_name, "children", None, &child.path)
        }
        Substitution::StringLiteral(literal) => Ok(quote(&literal.value)?),
        Substitution::IntLiteral(literal) => Ok(literal.value.to_string()),
        Substitution::FloatLiteral(literal) => Ok(format_float(literal.value)?),
        Substitution::BoolLiteral(literal) => Ok(literal.value.to_string()),
    }
}

fn serialize_function(call: &SubstitutionFunctionExpr) -> Result<String, SubstitutionError> {
    let mut errors = Vec::new();
    if !is_identifier(&call.function_name) {
        errors.push(SubstitutionError::from(SerializeError::InvalidFunctionName {
            name: call.function_name.clone(),
        }));
    }

    let mut args = Vec::with_capacity(call.arguments.len());
    for (index, arg) in call.arguments.iter().enumerate() {
        let Some(value) = &arg.value else {
            errors.push(
                SerializeError::MissingArgumentValue {
                    function: call.function_name.clone(),
                    index,
                }
                .into(),
            );
            continue;
        };
        let rendered = match serialize_substitution(value) {
            Ok(rendered) => rendered,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
        match &arg.name {
            Some(name) if !is_identifier(name) => errors.push(
                SerializeError::InvalidArgumentName {
                    function: call.function_name.clone(),
                    name: name.clone(),
                }
                .into(),
            ),
            Some(name) => args.push(format!("{} = {}", name, rendered)),
            None => args.push(rendered),
        }
    }

    let call_text = format!("{}({})", call.function_name, args.join(", "));
    let rendered = match render_path("function call", call_text, &call.path) {
        Ok(rendered) => Some(rendered),
        Err(err) => {
            errors.push(err.into());
            None
        }
    };

    match rendered {
        Some(rendered) if errors.is_empty() => Ok(rendered),
        _ => Err(SubstitutionError::combine(
            ErrorStage::Serialize,
            format!("failed to serialise call to function \"{}\"", call.function_name),
            errors,
        )),
    }
}

fn serialize_data_source(prop: &SubstitutionDataSourceProperty) -> Result<String, SubstitutionError> {
    let name = name_accessor("data source", &prop.data_source_name);
    let field = name_accessor("data source field", &prop.field_name);
    let (name, field) = match (name, field) {
        (Ok(name), Ok(field)) => (name, field),
        (name, field) => {
            let errors = [name.err(), field.err()]
                .into_iter()
                .flatten()
                .map(SubstitutionError::from)
                .collect();
            return Err(SubstitutionError::combine(
                ErrorStage::Serialize,
                format!(
                    "failed to serialise reference to data source \"{}\"",
                    prop.data_source_name
                ),
                errors,
            ));
        }
    };

    let mut output = format!("datasources{}{}", name, field);
    if let Some(index) = prop.primitive_arr_index {
        output.push_str(&format!("[{}]", index));
    }
    Ok(output)
}

/// `{keyword}{name}[index]{path}` with name and path errors reported together.
fn reference_with_path(
    kind: &str,
    name: &str,
    keyword: &str,
    index: Option<usize>,
    path: &[SubstitutionPathItem],
) -> Result<String, SubstitutionError> {
    let mut errors = Vec::new();
    let mut prefix = keyword.to_string();
    match name_accessor(kind, name) {
        Ok(accessor) => prefix.push_str(&accessor),
        Err(err) => {
            prefix.push_str(&format!("[\"{}\"]", name));
            errors.push(SubstitutionError::from(err));
        }
    }
    if let Some(index) = index {
        prefix.push_str(&format!("[{}]", index));
    }

    let element = format!("{} \"{}\"", kind, name);
    match render_path(&element, prefix, path) {
        Ok(rendered) if errors.is_empty() => Ok(rendered),
        Ok(_) => Err(SubstitutionError::combine(
            ErrorStage::Serialize,
            format!("failed to serialise {} reference", kind),
            errors,
        )),
        Err(err) => {
            errors.push(err.into());
            Err(SubstitutionError::combine(
                ErrorStage::Serialize,
                format!("failed to serialise {} reference", kind),
                errors,
            ))
        }
    }
}

/// Append path items to `prefix`. Invalid field names are written in
/// bracket form so the returned error shows where they sit in the path.
fn render_path(
    element: &str,
    prefix: String,
    path: &[SubstitutionPathItem],
) -> Result<String, SerializeError> {
    let mut raw_path = prefix;
    let mut errors = Vec::new();

    for item in path {
        match item {
            SubstitutionPathItem::FieldName(name) => match field_accessor(name) {
                Some(accessor) => raw_path.push_str(&accessor),
                None => {
                    raw_path.push_str(&format!("[\"{}\"]", name));
                    errors.push(SerializeError::InvalidFieldName { name: name.clone() });
                }
            },
            SubstitutionPathItem::ArrayIndex(index) => {
                raw_path.push_str(&format!("[{}]", index));
            }
        }
    }

    if errors.is_empty() {
        Ok(raw_path)
    } else {
        Err(SerializeError::InvalidPath {
            element: element.to_string(),
            raw_path,
            errors,
        })
    }
}

fn field_accessor(name: &str) -> Option<String> {
    if is_identifier(name) {
        Some(format!(".{}", name))
    } else if is_name_string(name) {
        Some(format!("[\"{}\"]", name))
    } else {
        None
    }
}

fn name_accessor(kind: &str, name: &str) -> Result<String, SerializeError> {
    field_accessor(name).ok_or_else(|| SerializeError::InvalidName {
        kind: kind.to_string(),
        name: name.to_string(),
    })
}

fn quote(value: &str) -> Result<String, SerializeError> {
    // The final backslash would escape the closing quote.
    if value.ends_with('\\') {
        return Err(SerializeError::TrailingBackslash {
            value: value.to_string(),
        });
    }
    Ok(format!("\"{}\"", value.replace('"', "\\\"")))
}

fn format_float(value: f64) -> Result<String, SerializeError> {
    if !value.is_finite() {
        return Err(SerializeError::NonFiniteFloat { value });
    }
    let text = value.to_string();
    if text.contains('.') {
        Ok(text)
    } else {
        Ok(format!("{}.0", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(sub: &Substitution) -> String {
        serialize_substitution(sub).unwrap()
    }

    #[test]
    fn test_references() {
        assert_eq!(render(&Substitution::variable("env")), "variables.env");
        assert_eq!(
            render(&Substitution::value("config", vec![field("nodes"), index(1)])),
            "values.config.nodes[1]"
        );
        assert_eq!(
            render(&Substitution::resource("orders.v1", vec![field("state")])),
            "resources[\"orders.v1\"].state"
        );
        assert_eq!(
            render(&Substitution::child("infra", vec![field("cache-host")])),
            "children.infra.cache-host"
        );
        assert_eq!(
            render(&Substitution::ElemIndexReference(Default::default())),
            "i"
        );
    }

    #[test]
    fn test_reserved_and_boolean_prefixed_names_use_brackets() {
        assert_eq!(
            render(&Substitution::value("x", vec![field("values"), field("trueName")])),
            "values.x[\"values\"][\"trueName\"]"
        );
    }

    #[test]
    fn test_data_source_with_index() {
        let sub = Substitution::DataSourceProperty(SubstitutionDataSourceProperty {
            data_source_name: "network".to_string(),
            field_name: "subnet.ids".to_string(),
            primitive_arr_index: Some(0),
            source_meta: None,
        });
        assert_eq!(render(&sub), "datasources.network[\"subnet.ids\"][0]");
    }

    #[test]
    fn test_resource_template_index() {
        let sub = Substitution::ResourceProperty(SubstitutionResourceProperty {
            resource_name: "bucket".to_string(),
            each_template_index: Some(3),
            path: vec![field("state"), field("id")],
            source_meta: None,
        });
        assert_eq!(render(&sub), "resources.bucket[3].state.id");
    }

    #[test]
    fn test_functions_and_literals() {
        let mut call = Substitution::function(
            "object",
            vec![],
        );
        if let Substitution::Function(f) = &mut call {
            f.arguments = vec![
                SubstitutionFunctionArg::named("label", Substitution::string("say \"hi\"")),
                SubstitutionFunctionArg::named("ratio", Substitution::float(2.0)),
                SubstitutionFunctionArg::named("count", Substitution::int(-4)),
                SubstitutionFunctionArg::named("enabled", Substitution::bool(true)),
            ];
            f.path = vec![field("label")];
        }
        assert_eq!(
            render(&call),
            r#"object(label = "say \"hi\"", ratio = 2.0, count = -4, enabled = true).label"#
        );
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.5).unwrap(), "1.5");
        assert_eq!(format_float(-3.0).unwrap(), "-3.0");
        assert_eq!(format_float(0.1).unwrap(), "0.1");
        assert!(format_float(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_names() {
        let err = serialize_substitution(&Substitution::variable("has space")).unwrap_err();
        assert!(matches!(
            err,
            SubstitutionError::Serialize(SerializeError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_invalid_path_reports_raw_path() {
        let sub = Substitution::resource("orders", vec![field("spec"), field("bad name"), index(0)]);
        let err = serialize_substitution(&sub).unwrap_err();
        match err {
            SubstitutionError::Serialize(SerializeError::InvalidPath {
                raw_path, errors, ..
            }) => {
                assert_eq!(raw_path, "resources.orders.spec[\"bad name\"][0]");
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_child_requires_path() {
        let err = serialize_substitution(&Substitution::child("infra", vec![])).unwrap_err();
        assert!(matches!(
            err,
            SubstitutionError::Serialize(SerializeError::EmptyChildPath { .. })
        ));
    }

    #[test]
    fn test_function_errors_are_aggregated() {
        let mut call = Substitution::function(
            "join",
            vec![Substitution::variable("bad name"), Substitution::child("c", vec![])],
        );
        if let Substitution::Function(f) = &mut call {
            f.arguments.push(SubstitutionFunctionArg {
                name: None,
                value: None,
                source_meta: None,
            });
        }
        let err = serialize_substitution(&call).unwrap_err();
        match err {
            SubstitutionError::Multiple { errors, .. } => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_interpolated_string() {
        let value = StringOrSubstitutions {
            values: vec![
                StringOrSubstitution::String {
                    value: "orders-".to_string(),
                    source_meta: None,
                },
                StringOrSubstitution::Substitution {
                    value: Substitution::variable("env"),
                    source_meta: None,
                },
            ],
            source_meta: None,
        };
        assert_eq!(
            serialize_substitutions(&value, None).unwrap(),
            "orders-${variables.env}"
        );
    }

    #[test]
    fn test_interpolated_string_error_names_context() {
        let value = StringOrSubstitutions {
            values: vec![StringOrSubstitution::Substitution {
                value: Substitution::variable("bad name"),
                source_meta: None,
            }],
            source_meta: None,
        };
        let err = serialize_substitutions(&value, Some("resources.orders.spec.name")).unwrap_err();
        assert!(err.to_string().contains("resources.orders.spec.name"));
    }
}
