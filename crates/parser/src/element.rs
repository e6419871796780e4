//! Blueprint elements a substitution can reference.

use crate::ast::Substitution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a referenceable blueprint element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Variable,
    Value,
    DataSource,
    Resource,
    Child,
}

impl ElementKind {
    /// Namespace used in element IDs and substitutions.
    pub fn namespace(self) -> &'static str {
        match self {
            ElementKind::Variable => "variables",
            ElementKind::Value => "values",
            ElementKind::DataSource => "datasources",
            ElementKind::Resource => "resources",
            ElementKind::Child => "children",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "variables" => Some(ElementKind::Variable),
            "values" => Some(ElementKind::Value),
            "datasources" => Some(ElementKind::DataSource),
            "resources" => Some(ElementKind::Resource),
            "children" => Some(ElementKind::Child),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElementKind::Variable => "variable",
            ElementKind::Value => "value",
            ElementKind::DataSource => "data source",
            ElementKind::Resource => "resource",
            ElementKind::Child => "child blueprint",
        };
        write!(f, "{}", label)
    }
}

/// `{namespace}.{name}`, e.g. `resources.ordersTable`.
pub fn element_id(kind: ElementKind, name: &str) -> String {
    format!("{}.{}", kind.namespace(), name)
}

/// Split an element ID back into its kind and name.
pub fn parse_element_id(id: &str) -> Option<(ElementKind, &str)> {
    let (namespace, name) = id.split_once('.')?;
    let kind = ElementKind::from_namespace(namespace)?;
    (!name.is_empty()).then_some((kind, name))
}

impl Substitution {
    /// The element this substitution references directly.
    ///
    /// Function calls, literals and `elem`/`i` reference no element
    /// themselves; arguments are not inspected.
    pub fn referenced_element(&self) -> Option<(ElementKind, &str)> {
        match self {
            Substitution::Variable(v) => Some((ElementKind::Variable, &v.variable_name)),
            Substitution::ValueReference(v) => Some((ElementKind::Value, &v.value_name)),
            Substitution::DataSourceProperty(d) => {
                Some((ElementKind::DataSource, &d.data_source_name))
            }
            Substitution::ResourceProperty(r) => Some((ElementKind::Resource, &r.resource_name)),
            Substitution::Child(c) => Some((ElementKind::Child, &c.child_name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ids() {
        assert_eq!(element_id(ElementKind::Resource, "orders"), "resources.orders");
        assert_eq!(element_id(ElementKind::DataSource, "net"), "datasources.net");
        assert_eq!(
            parse_element_id("children.core.v1"),
            Some((ElementKind::Child, "core.v1"))
        );
        assert_eq!(parse_element_id("exports.x"), None);
        assert_eq!(parse_element_id("values."), None);
    }

    #[test]
    fn test_referenced_element() {
        assert_eq!(
            Substitution::variable("env").referenced_element(),
            Some((ElementKind::Variable, "env"))
        );
        assert_eq!(Substitution::int(1).referenced_element(), None);
    }
}
