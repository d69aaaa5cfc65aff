use serde::{Deserialize, Serialize};

/// Request-level `_source` option: whether to return the stored document at
/// all, and which dotted field paths to keep or drop. Patterns may contain
/// `*` wildcards.
///
/// Accepts the shorthand request forms on deserialization:
///
/// ```text
/// true | false
/// "name"
/// ["name", "address.*"]
/// { "includes": ["name"], "excludes": ["address.zip"] }
/// { "include": "name", "exclude": "secret" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFilterSpec")]
pub struct FilterSpec {
    pub fetch_source: bool,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            fetch_source: true,
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }
}

impl FilterSpec {
    pub fn new<I, E>(includes: I, excludes: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            fetch_source: true,
            includes: includes.into_iter().map(Into::into).collect(),
            excludes: excludes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn include<I, S>(includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(includes, Vec::<String>::new())
    }

    pub fn exclude<E, S>(excludes: E) -> Self
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Vec::<String>::new(), excludes)
    }

    /// `_source: false`: hits carry no source at all.
    pub fn disabled() -> Self {
        Self {
            fetch_source: false,
            ..Self::default()
        }
    }

    pub fn has_filters(&self) -> bool {
        !self.includes.is_empty() || !self.excludes.is_empty()
    }
}

// ── Request shorthand ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFilterSpec {
    Flag(bool),
    Pattern(String),
    Patterns(Vec<String>),
    Object(ObjectForm),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectForm {
    #[serde(default = "default_fetch_source")]
    fetch_source: bool,
    #[serde(default, alias = "include")]
    includes: OneOrMany,
    #[serde(default, alias = "exclude")]
    excludes: OneOrMany,
}

#[derive(Deserialize, Default)]
#[serde(untagged)]
enum OneOrMany {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

fn default_fetch_source() -> bool {
    true
}

impl From<OneOrMany> for Vec<String> {
    fn from(v: OneOrMany) -> Self {
        match v {
            OneOrMany::None => Vec::new(),
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

impl From<RawFilterSpec> for FilterSpec {
    fn from(raw: RawFilterSpec) -> Self {
        match raw {
            RawFilterSpec::Flag(true) => FilterSpec::default(),
            RawFilterSpec::Flag(false) => FilterSpec::disabled(),
            RawFilterSpec::Pattern(p) => FilterSpec::include([p]),
            RawFilterSpec::Patterns(ps) => FilterSpec::include(ps),
            RawFilterSpec::Object(obj) => FilterSpec {
                fetch_source: obj.fetch_source,
                includes: obj.includes.into(),
                excludes: obj.excludes.into(),
            },
        }
    }
}
