use serde::{Deserialize, Serialize};

/// Discriminates the two kinds of entries stored in the bookmark tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// A bookmark carrying a URL.
    Node,
    /// A grouping entry that other items live under.
    Folder,
}

impl ItemType {
    /// Column value used in the `bookmarks.type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Node => "Node",
            ItemType::Folder => "Folder",
        }
    }

    /// Parses the stored column value. Unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Node" => Some(ItemType::Node),
            "Folder" => Some(ItemType::Folder),
            _ => None,
        }
    }
}

/// A single entry of a user's bookmark tree, either a `Node` or a `Folder`.
///
/// `path` is the parent location; the item itself lives at
/// `path + "/" + display_name` (see [`BookmarkItem::full_path`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkItem {
    pub id: String,
    pub user_name: String,
    pub path: String,
    pub display_name: String,
    pub url: String,
    pub sort_order: i32,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub child_count: i64,
    pub access_count: i64,
    pub favicon: String,
    pub created: i64,
    pub modified: Option<i64>,
}

impl BookmarkItem {
    /// Builds an unsaved bookmark node. `id` and timestamps are assigned by the store.
    pub fn node(user_name: &str, path: &str, display_name: &str, url: &str) -> Self {
        Self {
            id: String::new(),
            user_name: user_name.to_string(),
            path: path.to_string(),
            display_name: display_name.to_string(),
            url: url.to_string(),
            sort_order: 0,
            item_type: ItemType::Node,
            child_count: 0,
            access_count: 0,
            favicon: String::new(),
            created: 0,
            modified: None,
        }
    }

    /// Builds an unsaved folder.
    pub fn folder(user_name: &str, path: &str, display_name: &str) -> Self {
        Self {
            item_type: ItemType::Folder,
            ..Self::node(user_name, path, display_name, "")
        }
    }

    pub fn is_folder(&self) -> bool {
        self.item_type == ItemType::Folder
    }

    /// Location of this item, i.e. the `path` its children are stored under.
    pub fn full_path(&self) -> String {
        crate::services::path_model::full_path(&self.path, &self.display_name)
    }
}

/// Number of direct children found in storage below a folder's full path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChildCount {
    pub path: String,
    pub count: i64,
}
