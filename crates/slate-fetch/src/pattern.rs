use regex::Regex;

use crate::error::FetchError;
use crate::filter_spec::FilterSpec;

/// A dotted field path pattern. `*` matches any run of characters,
/// including `.`, so `address.*` covers `address.city` and
/// `address.geo.lat` alike.
///
/// A pattern also covers everything below what it names: `host` matches
/// `host`, `host.name` and `host.name.first`. The path is compared as text,
/// so a key that itself contains a dot (`{"host.name": 1}`) is covered the
/// same way as `{"host": {"name": 1}}`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    regex: Regex,
    /// Everything before the first `*`.
    stem: String,
    wildcard: bool,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, FetchError> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let full = format!(r"(?s)^{body}(?:\..*)?$");
        let regex = Regex::new(&full).map_err(|source| FetchError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let (stem, wildcard) = match pattern.find('*') {
            Some(at) => (pattern[..at].to_string(), true),
            None => (pattern.to_string(), false),
        };
        Ok(Self {
            regex,
            stem,
            wildcard,
        })
    }

    /// `path` is the pattern's field or lies beneath it.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Some extension of `path` could still match the pattern.
    pub fn matches_prefix(&self, path: &str) -> bool {
        self.stem.starts_with(path) || (self.wildcard && path.starts_with(&self.stem))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<PathPattern>, FetchError> {
    patterns.iter().map(|p| PathPattern::new(p)).collect()
}

/// How a field path relates to the include patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Take the entire field value.
    Full,
    /// Not matched itself, but a descendant path may be.
    Partial,
    None,
}

/// Compiled include/exclude patterns for one request.
///
/// Built once from a [`FilterSpec`], reused across every hit.
#[derive(Debug, Clone, Default)]
pub struct FieldMatcher {
    includes: Vec<PathPattern>,
    excludes: Vec<PathPattern>,
}

impl FieldMatcher {
    pub fn new(spec: &FilterSpec) -> Result<Self, FetchError> {
        Ok(Self {
            includes: compile(&spec.includes)?,
            excludes: compile(&spec.excludes)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn has_excludes(&self) -> bool {
        !self.excludes.is_empty()
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(path))
    }

    /// `path` is reused as scratch space and restored before returning.
    pub fn inclusion(&self, path: &mut String) -> Inclusion {
        if self.includes.is_empty() || self.includes.iter().any(|p| p.matches(path)) {
            return Inclusion::Full;
        }
        path.push('.');
        let below = self.includes.iter().any(|p| p.matches_prefix(path));
        path.pop();
        if below {
            Inclusion::Partial
        } else {
            Inclusion::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> PathPattern {
        PathPattern::new(p).unwrap()
    }

    #[test]
    fn literal_patterns() {
        let p = pattern("address.city");
        assert!(p.matches("address.city"));
        assert!(!p.matches("address"));
        assert!(!p.matches("address.cityname"));
        assert!(p.matches_prefix("address."));
        assert!(!p.matches_prefix("name."));
    }

    #[test]
    fn pattern_covers_descendants() {
        let p = pattern("host");
        assert!(p.matches("host"));
        assert!(p.matches("host.name"));
        assert!(p.matches("host.name.first"));
        assert!(!p.matches("hostname"));
        assert!(!p.matches("ghost"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = pattern("a+b(c)");
        assert!(p.matches("a+b(c)"));
        assert!(!p.matches("aab(c)"));
        assert!(!pattern("a.b").matches("axb"));
        assert!(pattern("$").matches("$.x"));
    }

    #[test]
    fn star_crosses_dots() {
        let p = pattern("address.*");
        assert!(p.matches("address.city"));
        assert!(p.matches("address.geo.lat"));
        assert!(!p.matches("address"));
        assert!(!p.matches("name"));
    }

    #[test]
    fn leading_and_inner_stars() {
        assert!(pattern("*.name").matches("user.name"));
        assert!(pattern("*.name").matches("a.b.name"));
        assert!(!pattern("*.name").matches("name"));
        assert!(pattern("us*er").matches("user"));
        assert!(pattern("us*er").matches("us.big.er"));
        assert!(pattern("*").matches("anything.at.all"));
        assert!(pattern("a**b").matches("ab"));
    }

    #[test]
    fn trailing_literal_after_star() {
        let p = pattern("*ab");
        assert!(p.matches("aab"));
        assert!(p.matches("abab"));
        assert!(p.matches("xab.child"));
        assert!(!p.matches("aba"));
    }

    #[test]
    fn prefix_matching_with_stars() {
        let p = pattern("*.name");
        assert!(p.matches_prefix("user."));
        assert!(p.matches_prefix("anything"));
        let p = pattern("user.*.id");
        assert!(p.matches_prefix("user."));
        assert!(p.matches_prefix("user.roles."));
        assert!(!p.matches_prefix("account."));
    }

    #[test]
    fn inclusion_levels() {
        let matcher = FieldMatcher::new(&FilterSpec::include(["name", "address.city"])).unwrap();
        let mut path = String::from("name");
        assert_eq!(matcher.inclusion(&mut path), Inclusion::Full);
        assert_eq!(path, "name");

        let mut path = String::from("address");
        assert_eq!(matcher.inclusion(&mut path), Inclusion::Partial);
        assert_eq!(path, "address");

        let mut path = String::from("age");
        assert_eq!(matcher.inclusion(&mut path), Inclusion::None);
    }

    #[test]
    fn dotted_key_under_included_ancestor() {
        let matcher = FieldMatcher::new(&FilterSpec::new(["host"], ["user"])).unwrap();
        let mut path = String::from("host.name");
        assert_eq!(matcher.inclusion(&mut path), Inclusion::Full);
        assert!(matcher.is_excluded("user.id"));
        assert!(!matcher.is_excluded("username"));
    }

    #[test]
    fn no_includes_means_everything() {
        let matcher = FieldMatcher::new(&FilterSpec::exclude(["secret"])).unwrap();
        let mut path = String::from("anything");
        assert_eq!(matcher.inclusion(&mut path), Inclusion::Full);
        assert!(matcher.is_excluded("secret"));
        assert!(!matcher.is_excluded("secrets"));
    }

    #[test]
    fn similar_prefix_is_not_partial() {
        let matcher = FieldMatcher::new(&FilterSpec::include(["address.city"])).unwrap();
        let mut path = String::from("addr");
        assert_eq!(matcher.inclusion(&mut path), Inclusion::None);
    }
}
