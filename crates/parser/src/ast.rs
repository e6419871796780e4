//! Syntax tree for substitutions.
//!
//! A `${...}` expression parses into a [`Substitution`]. A field value that
//! mixes literal text with substitutions parses into
//! [`StringOrSubstitutions`]:
//!
//! ```text
//! "orders-${variables.env}-${trim(values.suffix)}"
//! StringOrSubstitutions
//! ├── String("orders-")
//! ├── Substitution(Variable { variable_name: "env" })
//! ├── String("-")
//! └── Substitution(Function { function_name: "trim", arguments: [..] })
//! ```
//!
//! # Source Positions
//!
//! When line info is requested every node carries a [`SourceMeta`] with its
//! absolute position in the blueprint document. Trees built by hand leave
//! it as `None`.
//!
//! # Serialization
//!
//! All types implement `Serialize` and `Deserialize` for JSON interop.

use crate::position::SourceMeta;
use serde::{Deserialize, Serialize};

/// One navigation step after a reference: `.field`, `["field"]` or `[0]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionPathItem {
    FieldName(String),
    ArrayIndex(usize),
}

/// A parsed `${...}` expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substitution {
    Function(SubstitutionFunctionExpr),
    Variable(SubstitutionVariable),
    ValueReference(SubstitutionValueReference),
    ElemReference(SubstitutionElemReference),
    ElemIndexReference(SubstitutionElemIndexReference),
    DataSourceProperty(SubstitutionDataSourceProperty),
    ResourceProperty(SubstitutionResourceProperty),
    Child(SubstitutionChild),
    StringLiteral(Literal<String>),
    IntLiteral(Literal<i64>),
    FloatLiteral(Literal<f64>),
    BoolLiteral(Literal<bool>),
}

impl Substitution {
    pub fn source_meta(&self) -> Option<&SourceMeta> {
        match self {
            Substitution::Function(f) => f.source_meta.as_ref(),
            Substitution::Variable(v) => v.source_meta.as_ref(),
            Substitution::ValueReference(v) => v.source_meta.as_ref(),
            Substitution::ElemReference(e) => e.source_meta.as_ref(),
            Substitution::ElemIndexReference(e) => e.source_meta.as_ref(),
            Substitution::DataSourceProperty(d) => d.source_meta.as_ref(),
            Substitution::ResourceProperty(r) => r.source_meta.as_ref(),
            Substitution::Child(c) => c.source_meta.as_ref(),
            Substitution::StringLiteral(l) => l.source_meta.as_ref(),
            Substitution::IntLiteral(l) => l.source_meta.as_ref(),
            Substitution::FloatLiteral(l) => l.source_meta.as_ref(),
            Substitution::BoolLiteral(l) => l.source_meta.as_ref(),
        }
    }

    /// Short name of the variant, used in logs and diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Substitution::Function(_) => "function call",
            Substitution::Variable(_) => "variable reference",
            Substitution::ValueReference(_) => "value reference",
            Substitution::ElemReference(_) => "element reference",
            Substitution::ElemIndexReference(_) => "element index reference",
            Substitution::DataSourceProperty(_) => "data source reference",
            Substitution::ResourceProperty(_) => "resource reference",
            Substitution::Child(_) => "child reference",
            Substitution::StringLiteral(_) => "string literal",
            Substitution::IntLiteral(_) => "integer literal",
            Substitution::FloatLiteral(_) => "float literal",
            Substitution::BoolLiteral(_) => "boolean literal",
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Substitution::Variable(SubstitutionVariable {
            variable_name: name.into(),
            source_meta: None,
        })
    }

    pub fn value(name: impl Into<String>, path: Vec<SubstitutionPathItem>) -> Self {
        Substitution::ValueReference(SubstitutionValueReference {
            value_name: name.into(),
            path,
            source_meta: None,
        })
    }

    pub fn resource(name: impl Into<String>, path: Vec<SubstitutionPathItem>) -> Self {
        Substitution::ResourceProperty(SubstitutionResourceProperty {
            resource_name: name.into(),
            each_template_index: None,
            path,
            source_meta: None,
        })
    }

    pub fn data_source(name: impl Into<String>, field: impl Into<String>) -> Self {
        Substitution::DataSourceProperty(SubstitutionDataSourceProperty {
            data_source_name: name.into(),
            field_name: field.into(),
            primitive_arr_index: None,
            source_meta: None,
        })
    }

    pub fn child(name: impl Into<String>, path: Vec<SubstitutionPathItem>) -> Self {
        Substitution::Child(SubstitutionChild {
            child_name: name.into(),
            path,
            source_meta: None,
        })
    }

    pub fn function(name: impl Into<String>, arguments: Vec<Substitution>) -> Self {
        Substitution::Function(SubstitutionFunctionExpr {
            function_name: name.into(),
            arguments: arguments
                .into_iter()
                .map(SubstitutionFunctionArg::positional)
                .collect(),
            path: Vec::new(),
            source_meta: None,
        })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Substitution::StringLiteral(Literal::new(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Substitution::IntLiteral(Literal::new(value))
    }

    pub fn float(value: f64) -> Self {
        Substitution::FloatLiteral(Literal::new(value))
    }

    pub fn bool(value: bool) -> Self {
        Substitution::BoolLiteral(Literal::new(value))
    }
}

/// Shorthand for building property paths in code.
pub fn field(name: impl Into<String>) -> SubstitutionPathItem {
    SubstitutionPathItem::FieldName(name.into())
}

pub fn index(index: usize) -> SubstitutionPathItem {
    SubstitutionPathItem::ArrayIndex(index)
}

/// `name(arg, name = arg)` optionally followed by a property path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionFunctionExpr {
    pub function_name: String,
    pub arguments: Vec<SubstitutionFunctionArg>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<SubstitutionPathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// A function argument. `value` is only `None` in trees built by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionFunctionArg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Option<Box<Substitution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

impl SubstitutionFunctionArg {
    pub fn positional(value: Substitution) -> Self {
        Self {
            name: None,
            source_meta: value.source_meta().copied(),
            value: Some(Box::new(value)),
        }
    }

    pub fn named(name: impl Into<String>, value: Substitution) -> Self {
        Self {
            name: Some(name.into()),
            source_meta: None,
            value: Some(Box::new(value)),
        }
    }
}

/// `variables.name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionVariable {
    pub variable_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// `values.name` with an optional path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionValueReference {
    pub value_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<SubstitutionPathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// `elem` (the current item of an each loop) with an optional path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionElemReference {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<SubstitutionPathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// `i` or `elem.i`, the index of the current item of an each loop.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubstitutionElemIndexReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// `datasources.name.field` with an optional `[index]` into a primitive array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionDataSourceProperty {
    pub data_source_name: String,
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive_arr_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// `resources.name[index].path` or a bare `name.path`.
///
/// `each_template_index` picks one instance of a resource template
/// expanded with `each`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionResourceProperty {
    pub resource_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub each_template_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<SubstitutionPathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// `children.name.export` with an optional further path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionChild {
    pub child_name: String,
    pub path: Vec<SubstitutionPathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

impl<T> Literal<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            source_meta: None,
        }
    }
}

/// One part of an interpolated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringOrSubstitution {
    String {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_meta: Option<SourceMeta>,
    },
    Substitution {
        value: Substitution,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_meta: Option<SourceMeta>,
    },
}

impl StringOrSubstitution {
    pub fn source_meta(&self) -> Option<&SourceMeta> {
        match self {
            StringOrSubstitution::String { source_meta, .. }
            | StringOrSubstitution::Substitution { source_meta, .. } => source_meta.as_ref(),
        }
    }

    pub fn as_substitution(&self) -> Option<&Substitution> {
        match self {
            StringOrSubstitution::Substitution { value, .. } => Some(value),
            StringOrSubstitution::String { .. } => None,
        }
    }
}

/// An interpolated string: literal text and substitutions, in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StringOrSubstitutions {
    pub values: Vec<StringOrSubstitution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_meta: Option<SourceMeta>,
}

impl StringOrSubstitutions {
    /// All substitutions in the string, skipping literal text.
    pub fn substitutions(&self) -> impl Iterator<Item = &Substitution> {
        self.values.iter().filter_map(StringOrSubstitution::as_substitution)
    }

    /// The literal text when the string contains no substitutions.
    pub fn as_plain_string(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.values {
            match part {
                StringOrSubstitution::String { value, .. } => out.push_str(value),
                StringOrSubstitution::Substitution { .. } => return None,
            }
        }
        Some(out)
    }
}
