use super::ast::KeyPath;
use crate::document::node::YamlNode;

/// Descends from `root` through successive mapping keys.
///
/// Yields `None` for an empty path, a missing key, or a non-mapping node
/// before the last segment.
pub fn resolve<'a>(root: &'a YamlNode, path: &KeyPath) -> Option<&'a YamlNode> {
    if path.is_empty() {
        return None;
    }
    path.segments()
        .iter()
        .try_fold(root, |node, segment| node.get(segment))
}

/// Mutable variant of [`resolve`]. Only the returned node is marked as
/// modified, and only once it is written to.
pub fn resolve_mut<'a>(root: &'a mut YamlNode, path: &KeyPath) -> Option<&'a mut YamlNode> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for segment in path.segments() {
        current = current.get_mut(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::parse_yaml;
    use crate::document::node::YamlValue;

    const DOC: &str = "\
spec:
  values:
    a:
      image:
        tag: v1
    b:
      image:
        tag: v1
  list:
    - name: x
";

    #[test]
    fn test_resolve_nested_key() {
        let tree = parse_yaml(DOC).unwrap();
        let node = resolve(tree.root(), &KeyPath::parse("spec.values.b.image.tag")).unwrap();
        assert_eq!(node.value().as_str(), Some("v1"));
        assert_eq!(node.text_span().unwrap().start, DOC.rfind("v1").unwrap());
    }

    #[test]
    fn test_resolve_intermediate_node() {
        let tree = parse_yaml(DOC).unwrap();
        let node = resolve(tree.root(), &KeyPath::parse("spec.values.a")).unwrap();
        assert!(node.value().is_object());
    }

    #[test]
    fn test_missing_segment() {
        let tree = parse_yaml(DOC).unwrap();
        assert!(resolve(tree.root(), &KeyPath::parse("spec.values.c.image.tag")).is_none());
        assert!(resolve(tree.root(), &KeyPath::parse("kindergarten")).is_none());
    }

    #[test]
    fn test_does_not_descend_into_scalars_or_sequences() {
        let tree = parse_yaml(DOC).unwrap();
        assert!(resolve(tree.root(), &KeyPath::parse("spec.values.a.image.tag.x")).is_none());
        assert!(resolve(tree.root(), &KeyPath::parse("spec.list.0.name")).is_none());
        assert!(resolve(tree.root(), &KeyPath::parse("spec.list.name")).is_none());
    }

    #[test]
    fn test_empty_path_resolves_nothing() {
        let mut tree = parse_yaml(DOC).unwrap();
        assert!(resolve(tree.root(), &KeyPath::new(vec![])).is_none());
        assert!(resolve_mut(tree.root_mut(), &KeyPath::new(vec![])).is_none());
    }

    #[test]
    fn test_resolve_mut_matches_quoted_keys() {
        let mut tree = parse_yaml("\"kind\": Foo\n'api': v1\n").unwrap();
        let node = resolve_mut(tree.root_mut(), &KeyPath::parse("api")).unwrap();
        assert!(matches!(node.value(), YamlValue::String(_)));
        assert!(resolve_mut(tree.root_mut(), &KeyPath::parse("kind")).is_some());
    }
}
