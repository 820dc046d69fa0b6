//! Bookmark Manager.
//!
//! Implements `BookmarkStoreTrait`, the persistence layer for the bookmark
//! tree, backed by SQLite via `rusqlite`.
//!
//! The hierarchy lives in a single flat table: an item's parent is the Folder
//! row addressed by its `path`. Every write runs in one transaction that also
//! keeps the parent's `child_count` in step, so a failed step leaves no trace.

use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::services::path_model::{self, ROOT};
use crate::types::bookmark::{BookmarkItem, ItemType, PathChildCount};
use crate::types::errors::BookmarkError;

const COLUMNS: &str = "id, path, display_name, url, sort_order, type, user_name, \
                       child_count, access_count, favicon, created, modified";

/// Default number of entries returned by `get_most_visited`.
pub const DEFAULT_MOST_VISITED: i64 = 100;

/// Trait defining the bookmark store operations. Every call is scoped to `username`.
pub trait BookmarkStoreTrait {
    fn create(&mut self, item: BookmarkItem) -> Result<BookmarkItem, BookmarkError>;
    fn update(&mut self, item: BookmarkItem) -> Result<BookmarkItem, BookmarkError>;
    fn get_by_id(&self, id: &str, username: &str) -> Result<BookmarkItem, BookmarkError>;
    fn get_all(&self, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError>;
    fn get_by_path(&self, path: &str, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError>;
    fn get_by_path_prefix(&self, prefix: &str, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError>;
    fn get_by_name(&self, name: &str, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError>;
    fn get_folder_by_path_name(&self, path: &str, name: &str, username: &str) -> Result<BookmarkItem, BookmarkError>;
    fn get_folder_by_full_path(&self, full_path: &str, username: &str) -> Result<BookmarkItem, BookmarkError>;
    fn get_most_visited(&self, username: &str, limit: i64) -> Result<Vec<BookmarkItem>, BookmarkError>;
    fn record_access(&mut self, id: &str, username: &str) -> Result<BookmarkItem, BookmarkError>;
    fn delete(&mut self, id: &str, username: &str) -> Result<(), BookmarkError>;
    /// Removes the folder at `path` and its whole subtree. Returns the number of rows removed.
    fn delete_path(&mut self, path: &str, username: &str) -> Result<usize, BookmarkError>;
    fn path_child_count(&self, prefix: &str, username: &str) -> Result<Vec<PathChildCount>, BookmarkError>;
    /// Rewrites every stale `child_count`. Returns how many folders were corrected.
    fn reconcile_child_counts(&mut self, username: &str) -> Result<usize, BookmarkError>;
}

/// Bookmark store backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

/// A stored folder with its recorded and its actual number of direct children.
struct FolderCount {
    id: String,
    full_path: String,
    stored: i64,
    actual: i64,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn require(value: &str, field: &str) -> Result<(), BookmarkError> {
        if value.is_empty() {
            return Err(BookmarkError::Validation(format!("cannot use empty {}", field)));
        }
        Ok(())
    }

    /// A display name is a single path segment.
    fn require_segment(name: &str) -> Result<(), BookmarkError> {
        if name.contains(path_model::SEPARATOR) {
            return Err(BookmarkError::Validation(format!(
                "the name '{}' cannot contain the path separator '{}'",
                name,
                path_model::SEPARATOR
            )));
        }
        Ok(())
    }

    /// `path` with a trailing separator, the boundary used for subtree matching.
    fn subtree_prefix(path: &str) -> String {
        if path.ends_with(path_model::SEPARATOR) {
            path.to_string()
        } else {
            format!("{}{}", path, path_model::SEPARATOR)
        }
    }

    /// Reads a single `BookmarkItem` row into a struct.
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<BookmarkItem> {
        let type_value: String = row.get(5)?;
        let item_type = ItemType::parse(&type_value).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown item type '{}'", type_value).into(),
            )
        })?;
        Ok(BookmarkItem {
            id: row.get(0)?,
            path: row.get(1)?,
            display_name: row.get(2)?,
            url: row.get(3)?,
            sort_order: row.get(4)?,
            item_type,
            user_name: row.get(6)?,
            child_count: row.get(7)?,
            access_count: row.get(8)?,
            favicon: row.get(9)?,
            created: row.get(10)?,
            modified: row.get(11)?,
        })
    }

    fn query_items<P: rusqlite::Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<BookmarkItem>, BookmarkError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_item)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn fetch_by_id(conn: &Connection, id: &str, username: &str) -> Result<Option<BookmarkItem>, BookmarkError> {
        let sql = format!("SELECT {} FROM bookmarks WHERE user_name = ?1 AND id = ?2", COLUMNS);
        Ok(conn
            .query_row(&sql, params![username, id], Self::row_to_item)
            .optional()?)
    }

    fn count_children(conn: &Connection, full_path: &str, username: &str) -> Result<i64, BookmarkError> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM bookmarks WHERE user_name = ?1 AND path = ?2",
            params![username, full_path],
            |row| row.get(0),
        )?)
    }

    /// Adds `delta` to the child count of the Folder located at `folder_path`.
    /// Returns the number of folder rows touched (0 or 1).
    fn adjust_child_count(
        conn: &Connection,
        folder_path: &str,
        username: &str,
        delta: i64,
    ) -> Result<usize, BookmarkError> {
        let (parent, name) = path_model::split_leaf(folder_path).ok_or_else(|| {
            BookmarkError::Validation(format!("not a valid path '{}'", folder_path))
        })?;
        Ok(conn.execute(
            "UPDATE bookmarks SET child_count = MAX(child_count + ?1, 0) \
             WHERE user_name = ?2 AND path = ?3 AND display_name = ?4 AND type = ?5",
            params![delta, username, parent, name, ItemType::Folder.as_str()],
        )?)
    }

    /// Counts one more child below `folder_path`; the folder must exist.
    fn increment_parent(conn: &Connection, folder_path: &str, username: &str) -> Result<(), BookmarkError> {
        if folder_path == ROOT {
            return Ok(());
        }
        if Self::adjust_child_count(conn, folder_path, username, 1)? == 0 {
            let (path, name) = path_model::split_leaf(folder_path).unwrap_or((ROOT, folder_path));
            return Err(BookmarkError::Hierarchy {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Counts one child less below `folder_path`. A missing folder is logged, not fatal.
    fn decrement_parent(conn: &Connection, folder_path: &str, username: &str) -> Result<(), BookmarkError> {
        if folder_path == ROOT {
            return Ok(());
        }
        if Self::adjust_child_count(conn, folder_path, username, -1)? == 0 {
            tracing::warn!(path = folder_path, user = username, "parent folder missing while decrementing child count");
        }
        Ok(())
    }

    /// Commits `tx` when `result` is ok, otherwise rolls it back and returns the error.
    fn finish<T>(tx: Transaction<'_>, result: Result<T, BookmarkError>, operation: &str) -> Result<T, BookmarkError> {
        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(operation, error = %err, "could not complete the transaction");
                if let Err(rollback) = tx.rollback() {
                    return Err(BookmarkError::Persistence(format!(
                        "{}; could not rollback transaction: {}",
                        err, rollback
                    )));
                }
                Err(err)
            }
        }
    }

    fn insert(conn: &Connection, item: &BookmarkItem) -> Result<(), BookmarkError> {
        conn.execute(
            "INSERT INTO bookmarks (id, path, display_name, url, sort_order, type, user_name, \
             child_count, access_count, favicon, created, modified) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8, ?9, NULL)",
            params![
                item.id,
                item.path,
                item.display_name,
                item.url,
                item.sort_order,
                item.item_type.as_str(),
                item.user_name,
                item.favicon,
                item.created,
            ],
        )
        .map_err(|e| match BookmarkError::from(e) {
            BookmarkError::Conflict(_) => BookmarkError::Conflict(format!(
                "an item named '{}' already exists in path '{}'",
                item.display_name, item.path
            )),
            other => other,
        })?;
        Self::increment_parent(conn, &item.path, &item.user_name)
    }

    fn apply_update(conn: &Connection, item: &BookmarkItem) -> Result<(), BookmarkError> {
        let existing = Self::fetch_by_id(conn, &item.id, &item.user_name)?.ok_or_else(|| {
            BookmarkError::NotFound(format!("no bookmark with ID '{}' available", item.id))
        })?;

        let moved = existing.path != item.path;
        let renamed = existing.display_name != item.display_name;
        if existing.is_folder()
            && (moved || renamed)
            && Self::count_children(conn, &existing.full_path(), &item.user_name)? > 0
        {
            return Err(BookmarkError::Validation(format!(
                "the folder '{}' contains items and cannot be moved or renamed",
                existing.full_path()
            )));
        }

        // the item type is never changed, a folder keeps an empty url
        let url = if existing.is_folder() { "" } else { item.url.as_str() };
        let affected = conn
            .execute(
                "UPDATE bookmarks SET path = ?1, display_name = ?2, url = ?3, sort_order = ?4, \
                 favicon = ?5, modified = ?6 WHERE id = ?7 AND user_name = ?8",
                params![
                    item.path,
                    item.display_name,
                    url,
                    item.sort_order,
                    item.favicon,
                    Self::now(),
                    item.id,
                    item.user_name,
                ],
            )
            .map_err(|e| match BookmarkError::from(e) {
                BookmarkError::Conflict(_) => BookmarkError::Conflict(format!(
                    "an item named '{}' already exists in path '{}'",
                    item.display_name, item.path
                )),
                other => other,
            })?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(format!("no bookmark with ID '{}' available", item.id)));
        }

        if moved {
            Self::decrement_parent(conn, &existing.path, &item.user_name)?;
            Self::increment_parent(conn, &item.path, &item.user_name)?;
        }
        Ok(())
    }

    fn remove(conn: &Connection, id: &str, username: &str) -> Result<(), BookmarkError> {
        let existing = Self::fetch_by_id(conn, id, username)?.ok_or_else(|| {
            BookmarkError::NotFound(format!("no items were deleted for ID '{}'", id))
        })?;
        if existing.is_folder() && Self::count_children(conn, &existing.full_path(), username)? > 0 {
            return Err(BookmarkError::Validation(format!(
                "the folder '{}' is not empty, delete its path instead",
                existing.full_path()
            )));
        }

        let affected = conn.execute(
            "DELETE FROM bookmarks WHERE user_name = ?1 AND id = ?2",
            params![username, id],
        )?;
        if affected == 0 {
            return Err(BookmarkError::NotFound("no items were deleted".to_string()));
        }
        Self::decrement_parent(conn, &existing.path, username)
    }

    fn remove_path(conn: &Connection, path: &str, username: &str) -> Result<usize, BookmarkError> {
        let (parent, name) = path_model::split_leaf(path).ok_or_else(|| {
            BookmarkError::Validation("not a valid path, no path separator '/' found".to_string())
        })?;

        let descendants = conn.execute(
            "DELETE FROM bookmarks WHERE user_name = ?1 \
             AND (path = ?2 OR substr(path, 1, length(?3)) = ?3)",
            params![username, path, Self::subtree_prefix(path)],
        )?;
        if descendants == 0 {
            return Err(BookmarkError::NotFound(format!(
                "could not delete items for path '{}' and Username '{}'",
                path, username
            )));
        }

        // the folder itself is stored at (parent, name), outside the subtree above
        let folder = conn.execute(
            "DELETE FROM bookmarks WHERE user_name = ?1 AND path = ?2 AND display_name = ?3 AND type = ?4",
            params![username, parent, name, ItemType::Folder.as_str()],
        )?;
        if folder == 0 {
            return Err(BookmarkError::NotFound(format!(
                "could not delete folder '{}' in path '{}' for Username '{}'",
                name, parent, username
            )));
        }

        Self::decrement_parent(conn, parent, username)?;
        Ok(descendants + folder)
    }

    fn folder_counts(conn: &Connection, username: &str) -> Result<Vec<FolderCount>, BookmarkError> {
        let mut stmt = conn.prepare(
            "SELECT f.id, f.path, f.display_name, f.child_count, \
               (SELECT COUNT(*) FROM bookmarks c WHERE c.user_name = f.user_name AND c.path = \
                  CASE WHEN f.path = '/' THEN '/' || f.display_name \
                       ELSE f.path || '/' || f.display_name END) \
             FROM bookmarks f WHERE f.user_name = ?1 AND f.type = ?2 \
             ORDER BY f.path ASC, f.display_name ASC",
        )?;
        let rows = stmt.query_map(params![username, ItemType::Folder.as_str()], |row| {
            let path: String = row.get(1)?;
            let name: String = row.get(2)?;
            Ok(FolderCount {
                id: row.get(0)?,
                full_path: path_model::full_path(&path, &name),
                stored: row.get(3)?,
                actual: row.get(4)?,
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

impl<'a> BookmarkStoreTrait for BookmarkManager<'a> {
    /// Stores a new item and counts it in its parent folder.
    ///
    /// The caller is expected to have validated `item.path` with
    /// [`validate_path`](crate::services::hierarchy_validator::validate_path);
    /// a missing parent folder still aborts the transaction.
    fn create(&mut self, item: BookmarkItem) -> Result<BookmarkItem, BookmarkError> {
        Self::require(&item.user_name, "Username")?;
        Self::require(&item.path, "path")?;
        Self::require(&item.display_name, "name")?;
        Self::require_segment(&item.display_name)?;

        let mut item = item;
        item.id = Uuid::new_v4().to_string();
        item.created = Self::now();
        item.modified = None;
        item.child_count = 0;
        item.access_count = 0;
        if item.is_folder() {
            item.url.clear();
        }

        let tx = self.conn.unchecked_transaction()?;
        let result = Self::insert(&tx, &item);
        Self::finish(tx, result, "create")?;

        tracing::info!(id = %item.id, path = %item.path, name = %item.display_name, user = %item.user_name, "created bookmark item");
        Ok(item)
    }

    /// Overwrites path, display name, url, sort order and favicon of an existing item.
    ///
    /// Moving an item re-counts it from the old parent to the new one. A folder
    /// holding children keeps its location.
    fn update(&mut self, item: BookmarkItem) -> Result<BookmarkItem, BookmarkError> {
        if item.id.is_empty() {
            return Err(BookmarkError::Validation(
                "no ID for bookmark provided, cannot update".to_string(),
            ));
        }
        Self::require(&item.user_name, "Username")?;
        Self::require(&item.path, "path")?;
        Self::require(&item.display_name, "name")?;
        Self::require_segment(&item.display_name)?;

        let tx = self.conn.unchecked_transaction()?;
        let result = Self::apply_update(&tx, &item);
        Self::finish(tx, result, "update")?;

        tracing::info!(id = %item.id, user = %item.user_name, "updated bookmark item");
        self.get_by_id(&item.id, &item.user_name)
    }

    fn get_by_id(&self, id: &str, username: &str) -> Result<BookmarkItem, BookmarkError> {
        Self::require(id, "ID")?;
        Self::require(username, "Username")?;
        Self::fetch_by_id(self.conn, id, username)?
            .ok_or_else(|| BookmarkError::NotFound(format!("no bookmark with ID '{}' available", id)))
    }

    fn get_all(&self, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError> {
        Self::require(username, "Username")?;
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_name = ?1 \
             ORDER BY path ASC, sort_order ASC, display_name ASC",
            COLUMNS
        );
        Self::query_items(self.conn, &sql, params![username])
    }

    /// Direct children of `path`.
    fn get_by_path(&self, path: &str, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError> {
        Self::require(path, "path")?;
        Self::require(username, "Username")?;
        tracing::debug!(path, user = username, "get bookmarks by path");
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_name = ?1 AND path = ?2 \
             ORDER BY sort_order ASC, display_name ASC",
            COLUMNS
        );
        Self::query_items(self.conn, &sql, params![username, path])
    }

    /// Every item at or below `prefix`, matched on segment boundaries.
    fn get_by_path_prefix(&self, prefix: &str, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError> {
        Self::require(prefix, "path")?;
        Self::require(username, "Username")?;
        tracing::debug!(prefix, user = username, "get bookmarks by path prefix");
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_name = ?1 \
             AND (path = ?2 OR substr(path, 1, length(?3)) = ?3) \
             ORDER BY sort_order ASC, display_name ASC",
            COLUMNS
        );
        Self::query_items(self.conn, &sql, params![username, prefix, Self::subtree_prefix(prefix)])
    }

    /// Case-insensitive substring search over display names.
    ///
    /// SQLite's `lower()` folds ASCII only, so the match runs on Unicode
    /// lowercase in Rust over the tenant's rows.
    fn get_by_name(&self, name: &str, username: &str) -> Result<Vec<BookmarkItem>, BookmarkError> {
        Self::require(name, "name")?;
        Self::require(username, "Username")?;
        let needle = name.to_lowercase();
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_name = ?1 \
             ORDER BY sort_order ASC, display_name ASC",
            COLUMNS
        );
        Ok(Self::query_items(self.conn, &sql, params![username])?
            .into_iter()
            .filter(|item| item.display_name.to_lowercase().contains(&needle))
            .collect())
    }

    fn get_folder_by_path_name(&self, path: &str, name: &str, username: &str) -> Result<BookmarkItem, BookmarkError> {
        Self::require(path, "path")?;
        Self::require(name, "name")?;
        Self::require(username, "Username")?;
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_name = ?1 AND path = ?2 AND display_name = ?3 AND type = ?4",
            COLUMNS
        );
        self.conn
            .query_row(
                &sql,
                params![username, path, name, ItemType::Folder.as_str()],
                Self::row_to_item,
            )
            .optional()?
            .ok_or_else(|| {
                BookmarkError::NotFound(format!(
                    "could not get bookmark Folder for path '{}' and name '{}'",
                    path, name
                ))
            })
    }

    /// Resolves a folder by its own location. `/` yields an unsaved root folder.
    fn get_folder_by_full_path(&self, full_path: &str, username: &str) -> Result<BookmarkItem, BookmarkError> {
        Self::require(full_path, "path")?;
        Self::require(username, "Username")?;
        if full_path == ROOT {
            let mut root = BookmarkItem::folder(username, ROOT, "Root");
            root.id = format!("{}_ROOT", username);
            root.child_count = Self::count_children(self.conn, ROOT, username)?;
            return Ok(root);
        }
        let (path, name) = path_model::split_leaf(full_path).ok_or_else(|| {
            BookmarkError::Validation(format!("not a valid path '{}'", full_path))
        })?;
        self.get_folder_by_path_name(path, name, username)
    }

    /// Bookmarks that were opened at least once, most opened first.
    fn get_most_visited(&self, username: &str, limit: i64) -> Result<Vec<BookmarkItem>, BookmarkError> {
        Self::require(username, "Username")?;
        let limit = if limit < 1 { DEFAULT_MOST_VISITED } else { limit };
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE user_name = ?1 AND type = ?2 AND access_count > 0 \
             ORDER BY access_count DESC, COALESCE(modified, created) DESC, display_name ASC LIMIT ?3",
            COLUMNS
        );
        Self::query_items(self.conn, &sql, params![username, ItemType::Node.as_str(), limit])
    }

    fn record_access(&mut self, id: &str, username: &str) -> Result<BookmarkItem, BookmarkError> {
        Self::require(id, "ID")?;
        Self::require(username, "Username")?;
        let affected = self.conn.execute(
            "UPDATE bookmarks SET access_count = access_count + 1 WHERE user_name = ?1 AND id = ?2",
            params![username, id],
        )?;
        if affected == 0 {
            return Err(BookmarkError::NotFound(format!("no bookmark with ID '{}' available", id)));
        }
        self.get_by_id(id, username)
    }

    /// Deletes exactly one item. Deleting nothing is an error, not a no-op.
    fn delete(&mut self, id: &str, username: &str) -> Result<(), BookmarkError> {
        Self::require(id, "ID")?;
        Self::require(username, "Username")?;

        let tx = self.conn.unchecked_transaction()?;
        let result = Self::remove(&tx, id, username);
        Self::finish(tx, result, "delete")?;

        tracing::info!(id, user = username, "deleted bookmark item");
        Ok(())
    }

    /// Cascading delete of the folder at `path`, e.g. `/a/b` removes everything
    /// stored under `/a/b` plus the folder `b` in `/a`. All or nothing.
    fn delete_path(&mut self, path: &str, username: &str) -> Result<usize, BookmarkError> {
        Self::require(path, "path")?;
        if path == ROOT {
            return Err(BookmarkError::Validation("cannot delete the ROOT path '/'".to_string()));
        }
        if !path_model::is_well_formed(path) {
            return Err(BookmarkError::Validation(format!("not a valid path '{}'", path)));
        }
        Self::require(username, "Username")?;

        let tx = self.conn.unchecked_transaction()?;
        let result = Self::remove_path(&tx, path, username);
        let removed = Self::finish(tx, result, "delete_path")?;

        tracing::info!(path, user = username, removed, "deleted bookmark path");
        Ok(removed)
    }

    /// Direct children per folder location, restricted to folders at or below `prefix`.
    fn path_child_count(&self, prefix: &str, username: &str) -> Result<Vec<PathChildCount>, BookmarkError> {
        Self::require(prefix, "path")?;
        Self::require(username, "Username")?;
        Ok(Self::folder_counts(self.conn, username)?
            .into_iter()
            .filter(|f| path_model::is_within(&f.full_path, prefix))
            .map(|f| PathChildCount {
                path: f.full_path,
                count: f.actual,
            })
            .collect())
    }

    fn reconcile_child_counts(&mut self, username: &str) -> Result<usize, BookmarkError> {
        Self::require(username, "Username")?;

        let tx = self.conn.unchecked_transaction()?;
        let result = (|| -> Result<usize, BookmarkError> {
            let mut fixed = 0;
            for folder in Self::folder_counts(&tx, username)? {
                if folder.stored != folder.actual {
                    tracing::warn!(path = %folder.full_path, stored = folder.stored, actual = folder.actual, "repairing child count");
                    tx.execute(
                        "UPDATE bookmarks SET child_count = ?1 WHERE id = ?2 AND user_name = ?3",
                        params![folder.actual, folder.id, username],
                    )?;
                    fixed += 1;
                }
            }
            Ok(fixed)
        })();
        Self::finish(tx, result, "reconcile_child_counts")
    }
}
