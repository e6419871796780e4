//! Tags recording how a reference was discovered.
//!
//! Downstream ordering uses them to tell hard dependencies (substitution
//! references and `dependsOn`) apart from links.

/// A substitution in `used_in` references the tagged element.
pub fn sub_ref_tag(used_in: &str) -> String {
    format!("subRef:{}", used_in)
}

/// Like [`sub_ref_tag`], including the property path within `used_in`
/// that holds the substitution.
pub fn sub_ref_prop_tag(used_in: &str, property_path: &str) -> String {
    format!("subRefProp:{}:{}", used_in, property_path)
}

/// `used_in` lists the tagged element in `dependsOn`.
pub fn dependency_ref_tag(used_in: &str) -> String {
    format!("dependencyOf:{}", used_in)
}

/// The tagged element is linked from `from`.
pub fn link_tag(from: &str) -> String {
    format!("link:{}", from)
}

/// Whether the tags mark a hard dependency of `used_in`.
pub fn is_hard_dependency_of<'a>(tags: impl IntoIterator<Item = &'a String>, used_in: &str) -> bool {
    let sub_ref = sub_ref_tag(used_in);
    let dependency = dependency_ref_tag(used_in);
    tags.into_iter().any(|tag| *tag == sub_ref || *tag == dependency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_formats() {
        assert_eq!(sub_ref_tag("resources.a"), "subRef:resources.a");
        assert_eq!(
            sub_ref_prop_tag("resources.a", "spec.name"),
            "subRefProp:resources.a:spec.name"
        );
        assert_eq!(dependency_ref_tag("resources.a"), "dependencyOf:resources.a");
        assert_eq!(link_tag("resources.a"), "link:resources.a");
    }

    #[test]
    fn test_hard_dependency() {
        let tags = vec![link_tag("resources.a"), sub_ref_tag("resources.b")];
        assert!(is_hard_dependency_of(&tags, "resources.b"));
        assert!(!is_hard_dependency_of(&tags, "resources.a"));
    }
}
