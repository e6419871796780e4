//! Names of the core functions every blueprint can call.
//!
//! Functions ending in `_g` are higher-order variants that return a
//! function for use with `map`, `filter`, `flatmap` and friends, e.g.
//! `map(variables.hosts, replace_g("http://", "https://"))`.

/// The only core function that accepts named arguments.
pub const OBJECT_FUNCTION: &str = "object";

pub const CORE_FUNCTIONS: &[&str] = &[
    "fromjson",
    "fromjson_g",
    "jsondecode",
    "len",
    "substr",
    "substr_g",
    "replace",
    "replace_g",
    "trim",
    "trimprefix",
    "trimprefix_g",
    "trimsuffix",
    "trimsuffix_g",
    "split",
    "split_g",
    "join",
    "index",
    "last_index",
    "to_upper",
    "to_lower",
    "has_prefix",
    "has_prefix_g",
    "has_suffix",
    "has_suffix_g",
    "contains",
    "contains_g",
    "list",
    OBJECT_FUNCTION,
    "keys",
    "vals",
    "map",
    "filter",
    "reduce",
    "sort",
    "flatmap",
    "compose",
    "pipe",
    "getattr",
    "getelem",
    "link",
    "and",
    "or",
    "not",
    "eq",
    "gt",
    "ge",
    "lt",
    "le",
    "cwd",
    "datetime",
];

pub fn is_core_function(name: &str) -> bool {
    CORE_FUNCTIONS.contains(&name)
}

/// Whether `name` is a higher-order `_g` variant.
pub fn is_higher_order_variant(name: &str) -> bool {
    name.ends_with("_g") && is_core_function(name)
}

pub fn accepts_named_arguments(name: &str) -> bool {
    name == OBJECT_FUNCTION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_functions() {
        assert!(is_core_function("trimprefix"));
        assert!(is_core_function("datetime"));
        assert!(!is_core_function("upload_file"));
        assert!(is_higher_order_variant("split_g"));
        assert!(!is_higher_order_variant("split"));
        assert!(accepts_named_arguments("object"));
        assert!(!accepts_named_arguments("list"));
    }
}
