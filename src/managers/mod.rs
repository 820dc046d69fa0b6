// Bookmarks state managers
// Managers own the stateful, database-backed operations.

pub mod bookmark_manager;
