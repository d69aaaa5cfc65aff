use serde::{Deserialize, Serialize};
use slate_source::{Mapping, Node};

/// Where a nested hit lives inside its parent document: the field of the
/// nested object array, the position within that array, and, for nested
/// objects inside nested objects, the next level down.
///
/// Only `field` is used to find the object in the parent's source; `offset`
/// is reported back with the hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedIdentity {
    pub field: String,
    pub offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<NestedIdentity>>,
}

impl NestedIdentity {
    pub fn new(field: impl Into<String>, offset: usize) -> Self {
        Self {
            field: field.into(),
            offset,
            child: None,
        }
    }

    pub fn with_child(mut self, child: NestedIdentity) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Build a chain from `(field, offset)` pairs, outermost first.
    pub fn from_path<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        segments.into_iter().rev().fold(None, |child, (field, offset)| {
            let mut identity = NestedIdentity::new(field, offset);
            identity.child = child.map(Box::new);
            Some(identity)
        })
    }

    /// Segments from outermost to innermost.
    pub fn iter(&self) -> impl Iterator<Item = &NestedIdentity> {
        std::iter::successors(Some(self), |id| id.child.as_deref())
    }
}

/// Walk the identity chain down from `doc`, one field per level.
///
/// Returns `None` as soon as a level is missing or is not an object; a
/// filtered-away nested object is not an error.
pub fn extract_nested(doc: Mapping, identity: &NestedIdentity) -> Option<Mapping> {
    let mut current = doc;
    for segment in identity.iter() {
        match current.remove(&segment.field) {
            Some(Node::Mapping(child)) => current = child,
            _ => return None,
        }
    }
    Some(current)
}
