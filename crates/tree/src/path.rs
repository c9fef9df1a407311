//! Node path validation and resolution.
//!
//! Paths in the content tree are `/`-separated strings. Absolute paths start
//! at the root (`/`), relative paths are resolved against a node's own path.
//! Segments may carry a same-name-sibling index (`variant[2]`).

use crate::error::{ErrorKind, Result};

/// Validates and normalizes an absolute node path.
///
/// `.` segments and repeated separators are dropped, `..` pops the previous
/// segment. A path that climbs above the root, contains a null byte, or is
/// not absolute returns [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use frost_tree::path::normalize;
/// assert_eq!(normalize("/content//documents/./doc1/").unwrap(), "/content/documents/doc1");
/// assert_eq!(normalize("/content/a/../b").unwrap(), "/content/b");
/// assert_eq!(normalize("/").unwrap(), "/");
/// assert!(normalize("content/doc").is_err());
/// assert!(normalize("/../etc").is_err());
/// ```
pub fn normalize(path: impl AsRef<str>) -> Result<String> {
    let path = path.as_ref();
    if !path.starts_with('/') {
        exn::bail!(ErrorKind::InvalidPath(path.to_string()));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_string()));
                }
            },
            s if s.contains('\0') => exn::bail!(ErrorKind::InvalidPath(path.to_string())),
            s => segments.push(s),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Resolves `relative` against the absolute path `base`.
///
/// Relative paths must be non-empty and must not start with `/`.
pub fn join(base: impl AsRef<str>, relative: impl AsRef<str>) -> Result<String> {
    let relative = relative.as_ref();
    if relative.is_empty() || relative.starts_with('/') {
        exn::bail!(ErrorKind::InvalidPath(relative.to_string()));
    }
    normalize(format!("{}/{relative}", base.as_ref()))
}

/// Splits a normalized absolute path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Splits a segment into its name and 1-based same-name-sibling index.
///
/// ```
/// use frost_tree::path::parse_segment;
/// assert_eq!(parse_segment("doc1").unwrap(), ("doc1", 1));
/// assert_eq!(parse_segment("doc1[3]").unwrap(), ("doc1", 3));
/// assert!(parse_segment("doc1[0]").is_err());
/// ```
pub fn parse_segment(segment: &str) -> Result<(&str, usize)> {
    let Some(open) = segment.find('[') else {
        return Ok((segment, 1));
    };
    let index = segment[open..]
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|i| *i > 0);
    match (&segment[..open], index) {
        (name, Some(index)) if !name.is_empty() => Ok((name, index)),
        _ => exn::bail!(ErrorKind::InvalidPath(segment.to_string())),
    }
}

/// Builds the path segment for a child, omitting the index for the first
/// sibling of a name.
pub fn segment(name: &str, index: usize) -> String {
    match index {
        0 | 1 => name.to_string(),
        i => format!("{name}[{i}]"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/content/documents/doc1", "/content/documents/doc1")]
    #[case("/content//documents", "/content/documents")]
    #[case("/content/./documents/", "/content/documents")]
    #[case("/a/b/..", "/a")]
    #[case("/a/../b/../c", "/c")]
    #[case("/", "/")]
    #[case("//", "/")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("relative/path")]
    #[case("/..")]
    #[case("/a/../../b")]
    #[case("/a\0b")]
    fn test_normalize_rejects(#[case] input: &str) {
        let err = normalize(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/content", "documents/doc1").unwrap(), "/content/documents/doc1");
        assert_eq!(join("/content/documents", "../other").unwrap(), "/content/other");
        assert_eq!(join("/", "content").unwrap(), "/content");
        assert!(join("/content", "").is_err());
        assert!(join("/content", "/absolute").is_err());
        assert!(join("/content", "../../escape").is_err());
    }

    #[test]
    fn test_segments() {
        let parts: Vec<_> = segments("/content/documents/doc1").collect();
        assert_eq!(parts, vec!["content", "documents", "doc1"]);
        assert_eq!(segments("/").count(), 0);
    }

    #[rstest]
    #[case("doc1[2]", ("doc1", 2))]
    #[case("ns:name", ("ns:name", 1))]
    fn test_parse_segment(#[case] input: &str, #[case] expected: (&str, usize)) {
        assert_eq!(parse_segment(input).unwrap(), expected);
    }

    #[rstest]
    #[case("[2]")]
    #[case("doc1[x]")]
    #[case("doc1[2")]
    #[case("doc1[-1]")]
    fn test_parse_segment_rejects(#[case] input: &str) {
        assert!(parse_segment(input).is_err());
    }

    #[test]
    fn test_segment_round_trip_index() {
        assert_eq!(segment("doc1", 1), "doc1");
        assert_eq!(segment("doc1", 3), "doc1[3]");
    }
}
