//! Hierarchy Validator.
//!
//! Confirms that every ancestor segment of a target path is backed by a stored
//! Folder before an item may be created or moved there.
//!
//! For `/a/b/c` the checks run root-down and stop at the first gap:
//! - `/`    + `a`
//! - `/a`   + `b`
//! - `/a/b` + `c`

use crate::services::path_model;
use crate::types::errors::BookmarkError;

/// Answers whether a Folder named `name` is stored directly below `path`.
pub trait FolderLookup {
    fn exists(&self, path: &str, name: &str) -> bool;
}

impl<F> FolderLookup for F
where
    F: Fn(&str, &str) -> bool,
{
    fn exists(&self, path: &str, name: &str) -> bool {
        self(path, name)
    }
}

/// Validates that the folder chain leading to `path` exists.
///
/// The root `/` is always valid. Segments are checked in the order
/// [`path_model::ancestors`] yields them, so the reported error names the
/// shallowest missing folder.
pub fn validate_path<L: FolderLookup + ?Sized>(path: &str, lookup: &L) -> Result<(), BookmarkError> {
    if path.is_empty() {
        return Err(BookmarkError::Validation("cannot use empty path".to_string()));
    }
    let segments = path_model::ancestors(path).ok_or_else(|| {
        BookmarkError::Validation(format!(
            "not a valid path '{}', no path separator '/' found",
            path
        ))
    })?;

    for (parent, name) in &segments {
        if !lookup.exists(parent, name) {
            tracing::debug!(parent = %parent, name = %name, "missing folder in hierarchy");
            return Err(BookmarkError::Hierarchy {
                path: parent.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}
