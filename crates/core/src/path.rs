//! Key joining
//!
//! S3 keys are flat strings; `/` is only a convention. Joining therefore
//! works on strings and never touches the local filesystem.

/// Join key segments with a single `/`
///
/// `None` and empty segments are skipped. Each segment loses at most one
/// leading and one trailing slash; anything inside a segment, including
/// repeated slashes, is kept as-is.
pub fn s3_join<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    parts
        .into_iter()
        .flatten()
        .map(strip_outer_slash)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn strip_outer_slash(part: &str) -> &str {
    let part = part.strip_prefix('/').unwrap_or(part);
    part.strip_suffix('/').unwrap_or(part)
}
