//! Bookmarks: per-user bookmark storage with a folder hierarchy.
//!
//! Folders and bookmarks live in one flat SQLite table; the tree is inferred
//! from `/`-separated paths. This library crate exposes all modules for use by
//! the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
