use slate_source::{Mapping, Node};

use crate::nested::{NestedIdentity, extract_nested};
use crate::pattern::{FieldMatcher, Inclusion};

/// Filter a decoded document and, for nested hits, pull out the nested
/// object. `None` means the nested path was not present in the filtered
/// document.
pub fn project(
    doc: &Mapping,
    matcher: &FieldMatcher,
    nested: Option<&NestedIdentity>,
) -> Option<Mapping> {
    let filtered = filter_mapping(doc, matcher);
    match nested {
        Some(identity) => extract_nested(filtered, identity),
        None => Some(filtered),
    }
}

/// Keep the fields that match an include pattern (all fields when there are
/// none) and no exclude pattern.
///
/// Objects that are only partially included are kept when something inside
/// them survives. Objects that are included outright are kept even when
/// excludes empty them out. Running the filter over its own output with the
/// same matcher returns the same document.
pub fn filter_mapping(doc: &Mapping, matcher: &FieldMatcher) -> Mapping {
    if matcher.is_empty() {
        return doc.clone();
    }
    let mut path = String::new();
    filter_mapping_inner(doc, matcher, &mut path, false)
}

fn filter_mapping_inner(
    src: &Mapping,
    matcher: &FieldMatcher,
    path: &mut String,
    included: bool,
) -> Mapping {
    let mut dest = Mapping::new();
    for (key, value) in src.iter() {
        let base = path.len();
        if base > 0 {
            path.push('.');
        }
        path.push_str(key);

        if let Some(kept) = filter_field(value, matcher, path, included) {
            dest.insert(key.clone(), kept);
        }

        path.truncate(base);
    }
    dest
}

fn filter_field(
    value: &Node,
    matcher: &FieldMatcher,
    path: &mut String,
    parent_included: bool,
) -> Option<Node> {
    if matcher.is_excluded(path) {
        return None;
    }

    let inclusion = if parent_included {
        Inclusion::Full
    } else {
        matcher.inclusion(path)
    };
    if inclusion == Inclusion::None {
        return None;
    }
    let included = inclusion == Inclusion::Full;

    // Whole subtree taken and nothing below can be excluded.
    if included && !matcher.has_excludes() {
        return Some(value.clone());
    }

    match value {
        Node::Mapping(sub_doc) => {
            let trimmed = filter_mapping_inner(sub_doc, matcher, path, included);
            (included || !trimmed.is_empty()).then_some(Node::Mapping(trimmed))
        }
        Node::Sequence(items) => {
            let trimmed = filter_sequence(items, matcher, path, included);
            (included || !trimmed.is_empty()).then_some(Node::Sequence(trimmed))
        }
        other => included.then(|| other.clone()),
    }
}

/// Array elements share the array's path. Objects inside are filtered like
/// any other object; scalars survive only if the array itself is included.
fn filter_sequence(
    items: &[Node],
    matcher: &FieldMatcher,
    path: &mut String,
    included: bool,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Node::Mapping(elem_doc) => {
                let trimmed = filter_mapping_inner(elem_doc, matcher, path, included);
                if included || !trimmed.is_empty() {
                    out.push(Node::Mapping(trimmed));
                }
            }
            Node::Sequence(inner) => {
                let trimmed = filter_sequence(inner, matcher, path, included);
                if included || !trimmed.is_empty() {
                    out.push(Node::Sequence(trimmed));
                }
            }
            other if included => out.push(other.clone()),
            _ => {}
        }
    }
    out
}
