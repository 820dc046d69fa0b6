//! Property-based tests for Bookmark Manager operations.
//!
//! These tests apply random sequences of creates and deletes to a small folder
//! tree and verify that every stored `child_count` still equals the number of
//! direct children, and that cascading deletes never touch sibling folders.

use bookmarks::database::Database;
use bookmarks::managers::bookmark_manager::{BookmarkManager, BookmarkStoreTrait};
use bookmarks::types::bookmark::BookmarkItem;
use proptest::prelude::*;

const USER: &str = "prop";

/// Parent locations used by the generated operations. All of them exist
/// before the operations run.
const FOLDERS: &[(&str, &str)] = &[("/", "A"), ("/", "A1"), ("/A", "B"), ("/A/B", "C")];
const PARENTS: &[&str] = &["/", "/A", "/A1", "/A/B", "/A/B/C"];

#[derive(Debug, Clone)]
enum Op {
    Create { parent: usize, name: String, folder: bool },
    Delete { pick: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..PARENTS.len(), "[a-z]{1,6}", any::<bool>())
            .prop_map(|(parent, name, folder)| Op::Create { parent, name, folder }),
        1 => any::<usize>().prop_map(|pick| Op::Delete { pick }),
    ]
}

fn seeded(db: &Database) -> BookmarkManager<'_> {
    let mut mgr = BookmarkManager::new(db.connection());
    for (path, name) in FOLDERS {
        mgr.create(BookmarkItem::folder(USER, path, name)).expect("seed folder");
    }
    mgr
}

/// Compares every folder's stored count with its actual direct children.
fn assert_counts_consistent(mgr: &BookmarkManager) -> Result<(), TestCaseError> {
    for item in mgr.get_all(USER).expect("get_all") {
        if item.is_folder() {
            let children = mgr.get_by_path(&item.full_path(), USER).expect("get_by_path");
            prop_assert_eq!(item.child_count, children.len() as i64, "folder {}", item.full_path());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn child_counts_match_direct_children(ops in prop::collection::vec(arb_op(), 1..30)) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let mut mgr = seeded(&db);

        for op in ops {
            match op {
                Op::Create { parent, name, folder } => {
                    let item = if folder {
                        BookmarkItem::folder(USER, PARENTS[parent], &name)
                    } else {
                        BookmarkItem::node(USER, PARENTS[parent], &name, "http://example.com")
                    };
                    // duplicates are expected to fail without side effects
                    let _ = mgr.create(item);
                }
                Op::Delete { pick } => {
                    let all = mgr.get_all(USER).expect("get_all");
                    if all.is_empty() {
                        continue;
                    }
                    let target = &all[pick % all.len()];
                    // non-empty folders are refused, which must also leave counts intact
                    let _ = mgr.delete(&target.id, USER);
                }
            }
            assert_counts_consistent(&mgr)?;
        }

        prop_assert_eq!(mgr.reconcile_child_counts(USER).expect("reconcile"), 0);
    }

    #[test]
    fn delete_path_leaves_prefix_siblings(names in prop::collection::vec("[a-z]{1,6}", 1..8)) {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let mut mgr = seeded(&db);

        for name in &names {
            let _ = mgr.create(BookmarkItem::node(USER, "/A", name, "http://a"));
            let _ = mgr.create(BookmarkItem::node(USER, "/A1", name, "http://a1"));
        }
        let siblings_before = mgr.get_by_path_prefix("/A1", USER).expect("prefix").len();

        mgr.delete_path("/A", USER).expect("delete_path");

        prop_assert!(mgr.get_by_path_prefix("/A", USER).expect("prefix").is_empty());
        prop_assert_eq!(mgr.get_by_path_prefix("/A1", USER).expect("prefix").len(), siblings_before);
        prop_assert!(mgr.get_folder_by_path_name("/", "A1", USER).is_ok());
        assert_counts_consistent(&mgr)?;
    }
}
