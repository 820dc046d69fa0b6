// Bookmarks Path Model
// Pure helpers for `/`-rooted folder paths such as `/A/B/C`. No I/O.

/// The path separator and the root path.
pub const SEPARATOR: char = '/';
pub const ROOT: &str = "/";

/// Splits `path` at its last separator into `(parent, leaf)`.
///
/// Returns `None` for an empty input or when no separator exists.
/// A separator at index 0 yields the root `/` as parent.
///
/// ```
/// use bookmarks::services::path_model::split_leaf;
///
/// assert_eq!(split_leaf("/A/B"), Some(("/A", "B")));
/// assert_eq!(split_leaf("/A"), Some(("/", "A")));
/// assert_eq!(split_leaf("A"), None);
/// ```
pub fn split_leaf(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind(SEPARATOR)?;
    let parent = if idx == 0 { ROOT } else { &path[..idx] };
    Some((parent, &path[idx + 1..]))
}

/// A path is well-formed when it is non-empty, starts with `/` and, unless it
/// is the root itself, does not end with `/`.
pub fn is_well_formed(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    !path.is_empty() && path.starts_with(SEPARATOR) && !path.ends_with(SEPARATOR)
}

/// Joins a parent path and a leaf name.
///
/// A parent ending in `/` (only the root, for well-formed paths) is
/// concatenated directly, otherwise a separator is inserted.
pub fn full_path(parent: &str, leaf: &str) -> String {
    if parent.ends_with(SEPARATOR) {
        format!("{}{}", parent, leaf)
    } else {
        format!("{}{}{}", parent, SEPARATOR, leaf)
    }
}

/// Decomposes `path` into the `(parent, leaf)` pair of every ancestor
/// segment, ordered from the root downward.
///
/// `/a/b/c` yields `[("/", "a"), ("/a", "b"), ("/a/b", "c")]`; the root yields
/// nothing. Returns `None` when a segment has no separator.
pub fn ancestors(path: &str) -> Option<Vec<(String, String)>> {
    let mut segments = Vec::new();
    let mut current = path;
    while current != ROOT {
        let (parent, leaf) = split_leaf(current)?;
        segments.push((parent.to_string(), leaf.to_string()));
        current = parent;
    }
    segments.reverse();
    Some(segments)
}

/// True when `candidate` equals `prefix` or lies below it on a segment
/// boundary. `/Folder1` is not below `/Folder10`. Every path is below the root.
pub fn is_within(candidate: &str, prefix: &str) -> bool {
    if prefix == ROOT {
        return candidate.starts_with(SEPARATOR);
    }
    match candidate.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}
