//! Extracting element references from substitutions and reporting them to
//! a collector.

use crate::collector::ReferenceChainCollector;
use crate::error::CollectError;
use crate::tags::{dependency_ref_tag, link_tag, sub_ref_prop_tag, sub_ref_tag};
use blueprint_substitutions_parser::ast::{StringOrSubstitutions, Substitution};
use blueprint_substitutions_parser::{element_id, ElementKind, SourceMeta};
use serde::Serialize;

/// Name of the function whose string arguments name linked resources.
const LINK_FUNCTION: &str = "link";

/// A blueprint element referenced from a substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementReference {
    pub kind: ElementKind,
    pub name: String,
    /// `{namespace}.{name}`, the node name used in reference chains.
    pub element_id: String,
    /// Found through a string argument of `link(...)` rather than a
    /// reference expression.
    pub via_link: bool,
    pub source_meta: Option<SourceMeta>,
}

impl ElementReference {
    fn new(kind: ElementKind, name: &str, source_meta: Option<SourceMeta>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            element_id: element_id(kind, name),
            via_link: false,
            source_meta,
        }
    }
}

/// Every element referenced anywhere in `substitution`, including
/// function arguments, in the order they appear.
///
/// `elem` and `i` refer to the current template item, not to an element,
/// and are skipped.
pub fn extract_element_references(substitution: &Substitution) -> Vec<ElementReference> {
    let mut references = Vec::new();
    walk(substitution, &mut references);
    references
}

/// References from every substitution in an interpolated string.
pub fn extract_from_values(values: &StringOrSubstitutions) -> Vec<ElementReference> {
    values
        .substitutions()
        .flat_map(extract_element_references)
        .collect()
}

fn walk(substitution: &Substitution, out: &mut Vec<ElementReference>) {
    if let Some((kind, name)) = substitution.referenced_element() {
        out.push(ElementReference::new(
            kind,
            name,
            substitution.source_meta().copied(),
        ));
        return;
    }

    if let Substitution::Function(call) = substitution {
        for arg in &call.arguments {
            let Some(value) = arg.value.as_deref() else {
                continue;
            };
            match value {
                Substitution::StringLiteral(literal) if call.function_name == LINK_FUNCTION => {
                    let mut reference = ElementReference::new(
                        ElementKind::Resource,
                        &literal.value,
                        literal.source_meta,
                    );
                    reference.via_link = true;
                    out.push(reference);
                }
                _ => walk(value, out),
            }
        }
    }
}

/// Report every element referenced by `substitution` as a dependency of
/// `used_in`.
///
/// References are tagged with [`sub_ref_tag`] and [`sub_ref_prop_tag`];
/// resources named in `link(...)` get [`sub_ref_tag`] and [`link_tag`].
/// `payload` supplies the definition stored on each referenced node.
/// References from an element to itself are left to validation and not
/// collected. Returns the number of references collected.
pub fn collect_substitution_references<E>(
    collector: &mut ReferenceChainCollector<E>,
    used_in: &str,
    property_path: &str,
    substitution: &Substitution,
    mut payload: impl FnMut(&ElementReference) -> Option<E>,
) -> Result<usize, CollectError> {
    let mut collected = 0;
    for reference in extract_element_references(substitution) {
        if reference.element_id == used_in {
            tracing::debug!(element = used_in, "skipping self reference");
            continue;
        }
        let tags = if reference.via_link {
            vec![sub_ref_tag(used_in), link_tag(used_in)]
        } else {
            vec![sub_ref_tag(used_in), sub_ref_prop_tag(used_in, property_path)]
        };
        let element = payload(&reference);
        collector.collect(&reference.element_id, element, Some(used_in), &tags)?;
        collected += 1;
    }
    Ok(collected)
}

/// Report the resources `resource_name` lists in `dependsOn`, tagged with
/// [`dependency_ref_tag`].
///
/// Names are resource names without the `resources.` prefix. A resource
/// depending on itself is left to validation and not collected. Returns
/// the number of dependencies collected.
pub fn collect_depends_on<E>(
    collector: &mut ReferenceChainCollector<E>,
    resource_name: &str,
    depends_on: &[&str],
    mut payload: impl FnMut(&str) -> Option<E>,
) -> Result<usize, CollectError> {
    let used_in = element_id(ElementKind::Resource, resource_name);
    let tags = [dependency_ref_tag(&used_in)];
    let mut collected = 0;
    for &dependency in depends_on {
        if dependency == resource_name {
            tracing::debug!(resource = resource_name, "skipping self dependency");
            continue;
        }
        let dependency_id = element_id(ElementKind::Resource, dependency);
        collector.collect(&dependency_id, payload(dependency), Some(&used_in), &tags)?;
        collected += 1;
    }
    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_substitutions_parser::{parse_substitution, parse_substitution_values, ParseOptions};
    use pretty_assertions::assert_eq;

    fn ids(text: &str) -> Vec<String> {
        let sub = parse_substitution(text, &ParseOptions::default()).unwrap();
        extract_element_references(&sub)
            .into_iter()
            .map(|r| r.element_id)
            .collect()
    }

    #[test]
    fn test_extract_references() {
        assert_eq!(ids("variables.env"), vec!["variables.env"]);
        assert_eq!(ids("ordersTable.spec.id"), vec!["resources.ordersTable"]);
        assert_eq!(
            ids("join(values.parts, datasources.net.subnets[0], children.core.topic)"),
            vec!["values.parts", "datasources.net", "children.core"]
        );
        assert_eq!(ids("map(elem.items, i)"), Vec::<String>::new());
        assert_eq!(ids("\"plain\""), Vec::<String>::new());
    }

    #[test]
    fn test_link_arguments_name_resources() {
        let sub = parse_substitution(r#"link("api", "table")"#, &ParseOptions::default()).unwrap();
        let refs = extract_element_references(&sub);
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.via_link && r.kind == ElementKind::Resource));
        assert_eq!(refs[1].element_id, "resources.table");
    }

    #[test]
    fn test_extract_from_values() {
        let values = parse_substitution_values(
            "${variables.a}-${trim(values.b)}",
            &ParseOptions::default(),
        )
        .unwrap();
        let refs: Vec<_> = extract_from_values(&values)
            .into_iter()
            .map(|r| r.element_id)
            .collect();
        assert_eq!(refs, vec!["variables.a", "values.b"]);
    }

    #[test]
    fn test_collect_with_tags() {
        let sub = parse_substitution(
            r#"object(arn = resources.table.state.arn, l = link("api", "queue"), me = resources.api.spec.id)"#,
            &ParseOptions::default(),
        )
        .unwrap();
        let mut collector = ReferenceChainCollector::new();
        let count = collect_substitution_references(
            &mut collector,
            "resources.api",
            "spec.env",
            &sub,
            |r| Some(r.kind),
        )
        .unwrap();

        assert_eq!(count, 2);
        let table = collector.chain("resources.table").unwrap();
        assert_eq!(table.element, Some(ElementKind::Resource));
        assert!(table.has_tag("subRef:resources.api"));
        assert!(table.has_tag("subRefProp:resources.api:spec.env"));
        let queue = collector.chain("resources.queue").unwrap();
        assert!(queue.has_tag("link:resources.api"));
        assert!(collector
            .chain("resources.api")
            .unwrap()
            .references
            .contains("resources.table"));
        assert!(!collector.has_circular_references());
    }

    #[test]
    fn test_depends_on_and_links() {
        let mut collector: ReferenceChainCollector<()> = ReferenceChainCollector::new();
        let count =
            collect_depends_on(&mut collector, "api", &["table", "api", "queue"], |_| None).unwrap();
        assert_eq!(count, 2);

        let sub = parse_substitution(r#"link("api", "bucket")"#, &ParseOptions::default()).unwrap();
        collect_substitution_references(&mut collector, "resources.api", "spec.x", &sub, |_| None)
            .unwrap();

        let table = collector.chain("resources.table").unwrap();
        assert!(table.has_tag("dependencyOf:resources.api"));
        assert!(table.is_hard_dependency_of("resources.api"));
        assert!(!collector
            .chain("resources.bucket")
            .unwrap()
            .is_hard_dependency_of("resources.api"));
        assert_eq!(
            collector
                .references_of("resources.api")
                .iter()
                .map(|node| node.element_name.as_str())
                .collect::<Vec<_>>(),
            vec!["resources.table", "resources.queue", "resources.bucket"]
        );
    }
}
