//! Child name matching for filtered child listings.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use std::str::FromStr;

/// A compiled child name filter.
///
/// Two syntaxes are accepted, mirroring the two filtered listing operations on
/// [`Node`](crate::Node):
///
/// - a **name pattern** ([`FromStr`]): `|`-separated alternatives, whitespace
///   around each alternative trimmed, e.g. `"hippo:* | myproject:title"`.
/// - a **glob list** ([`from_globs`](Self::from_globs)): one alternative per
///   entry, taken verbatim.
///
/// In both forms `*` matches any run of characters (including none) and every
/// other character is literal.
///
/// ```
/// use frost_tree::NamePattern;
/// let pattern: NamePattern = "doc* | ns1:description".parse().unwrap();
/// assert!(pattern.matches("doc1"));
/// assert!(pattern.matches("ns1:description"));
/// assert!(!pattern.matches("ns1:title"));
/// ```
#[derive(Debug, Clone)]
pub struct NamePattern {
    // `None` for an empty glob list, which matches nothing.
    regex: Option<Regex>,
}

impl NamePattern {
    /// Builds a filter matching any of the given globs.
    pub fn from_globs<I, S>(globs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = globs.into_iter().map(|g| glob_to_regex(g.as_ref())).collect();
        Self::compile(&alternatives)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(name))
    }

    fn compile(alternatives: &[String]) -> Result<Self> {
        if alternatives.is_empty() {
            return Ok(Self { regex: None });
        }
        let source = format!("^(?:{})$", alternatives.join("|"));
        let regex = Regex::new(&source).or_raise(|| ErrorKind::InvalidArgument(source.clone()))?;
        Ok(Self { regex: Some(regex) })
    }
}

impl FromStr for NamePattern {
    type Err = crate::error::Error;

    fn from_str(pattern: &str) -> std::result::Result<Self, Self::Err> {
        let alternatives: Vec<String> = pattern.split('|').map(|p| glob_to_regex(p.trim())).collect();
        Self::compile(&alternatives)
    }
}

fn glob_to_regex(glob: &str) -> String {
    glob.split('*').map(regex::escape).collect::<Vec<_>>().join(".*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("doc1", "doc1", true)]
    #[case("doc1", "doc10", false)]
    #[case("doc*", "doc10", true)]
    #[case("*:title", "ns1:title", true)]
    #[case("ns1:title | ns1:body", "ns1:body", true)]
    #[case(" ns1:title|ns1:body ", "ns1:title", true)]
    #[case("a.b", "axb", false)]
    #[case("(x)", "(x)", true)]
    fn test_name_pattern(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        let pattern: NamePattern = pattern.parse().unwrap();
        assert_eq!(pattern.matches(name), expected);
    }

    #[test]
    fn test_globs_are_not_trimmed() {
        let pattern = NamePattern::from_globs([" doc1", "ns1:*"]).unwrap();
        assert!(!pattern.matches("doc1"));
        assert!(pattern.matches(" doc1"));
        assert!(pattern.matches("ns1:anything"));
    }

    #[test]
    fn test_empty_glob_list_matches_nothing() {
        let globs: [&str; 0] = [];
        let pattern = NamePattern::from_globs(globs).unwrap();
        assert!(!pattern.matches(""));
        assert!(!pattern.matches("doc1"));
    }
}
