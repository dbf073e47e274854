//! Container-syntax unwrapping for Java-style type names.
//!
//! Exposed method signatures reference application classes through container
//! types (`List<Foo>`, `Foo[]`, `Map<K, V>`); the proxy planner needs the
//! bare element class names, recursively for nested containers.

/// Innermost element types of a (possibly nested) generic or array type.
///
/// `List<String>` -> `["String"]`, `String[]` -> `["String"]`,
/// `List<List<Foo>>` -> `["Foo"]`, `Map<K, V>` -> `["K", "V"]`.
/// A plain type name resolves to itself.
pub fn element_types(type_name: &str) -> Vec<String> {
    let trimmed = type_name.trim();
    if let Some(prefix) = trimmed.strip_suffix("[]") {
        return element_types(prefix);
    }
    if trimmed.ends_with('>') {
        if let Some(open) = trimmed.find('<') {
            let inner = &trimmed[open + 1..trimmed.len() - 1];
            let mut out = Vec::new();
            for arg in split_top_level(inner) {
                for elem in element_types(&arg) {
                    if !out.contains(&elem) {
                        out.push(elem);
                    }
                }
            }
            return out;
        }
    }
    vec![trimmed.to_string()]
}

/// Outermost type name with container syntax stripped: `List<Foo>` ->
/// `List`, `Foo[]` -> `Foo`, plain names pass through.
pub fn base_type(type_name: &str) -> String {
    let trimmed = type_name.trim();
    if let Some(prefix) = trimmed.strip_suffix("[]") {
        return base_type(prefix);
    }
    if let Some(open) = trimmed.find('<') {
        return trimmed[..open].to_string();
    }
    trimmed.to_string()
}

/// Element types of a container type, or empty for a plain type name.
pub fn generic_arguments(type_name: &str) -> Vec<String> {
    let trimmed = type_name.trim();
    let is_container =
        trimmed.ends_with("[]") || (trimmed.ends_with('>') && trimmed.contains('<'));
    if is_container {
        element_types(trimmed)
    } else {
        Vec::new()
    }
}

/// Split a generic argument list on commas at nesting depth zero.
fn split_top_level(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in args.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_type_resolves_to_itself() {
        assert_eq!(element_types("com.example.Foo"), vec!["com.example.Foo"]);
    }

    #[test]
    fn test_simple_generic() {
        assert_eq!(element_types("List<String>"), vec!["String"]);
    }

    #[test]
    fn test_array_suffix() {
        assert_eq!(element_types("String[]"), vec!["String"]);
    }

    #[test]
    fn test_nested_generic_recovers_innermost() {
        assert_eq!(element_types("List<List<Foo>>"), vec!["Foo"]);
    }

    #[test]
    fn test_multiple_arguments() {
        assert_eq!(element_types("Map<K, V>"), vec!["K", "V"]);
        assert_eq!(
            element_types("java.util.Map<java.lang.String, com.example.Foo>"),
            vec!["java.lang.String", "com.example.Foo"]
        );
    }

    #[test]
    fn test_array_of_generic() {
        assert_eq!(element_types("List<Foo>[]"), vec!["Foo"]);
    }

    #[test]
    fn test_base_type() {
        assert_eq!(base_type("java.util.List<com.example.Foo>"), "java.util.List");
        assert_eq!(base_type("Foo[]"), "Foo");
        assert_eq!(base_type("com.example.Foo"), "com.example.Foo");
    }

    #[test]
    fn test_generic_arguments_empty_for_plain_types() {
        assert!(generic_arguments("com.example.Foo").is_empty());
        assert_eq!(generic_arguments("List<Foo>"), vec!["Foo"]);
        assert_eq!(generic_arguments("Foo[]"), vec!["Foo"]);
    }
}
