use crate::filter_spec::FilterSpec;

/// What to do with one hit's stored source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Return the stored bytes untouched, no decode.
    PassThrough,
    /// Decode, filter, extract the nested object if any, re-encode.
    Filter,
}

/// Top-level hits with no include/exclude patterns skip decoding entirely.
/// Nested hits always go through the filter path since their source is a
/// slice of the parent document.
pub fn plan(spec: &FilterSpec, is_nested: bool) -> Plan {
    if !is_nested && !spec.has_filters() {
        Plan::PassThrough
    } else {
        Plan::Filter
    }
}
