//! RPC method handler for the bookmarks JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` translates a method call of an already authenticated user
//! into validator and store calls and renders the result as JSON.

use std::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkStoreTrait};
use crate::services::hierarchy_validator::validate_path;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{BookmarkItem, ItemType};
use crate::types::errors::{BookmarkError, SettingsError};
use crate::types::settings::ValidationSettings;

/// Payload accepted by `bookmarks.create` and `bookmarks.update`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkRequest {
    #[serde(default)]
    id: Option<String>,
    path: String,
    display_name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    sort_order: i32,
    #[serde(rename = "type", default = "default_item_type")]
    item_type: ItemType,
    #[serde(default)]
    favicon: String,
}

fn default_item_type() -> ItemType {
    ItemType::Node
}

/// Renders a store error as `{"kind", "message"}`.
pub fn error_value(err: &BookmarkError) -> Value {
    json!({"kind": err.kind(), "message": err.to_string()})
}

fn invalid(message: &str) -> Value {
    error_value(&BookmarkError::Validation(message.to_string()))
}

fn str_param<'p>(params: &'p Value, key: &str) -> Result<&'p str, Value> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid(&format!("missing {} parameter", key)))
}

fn item_value(item: &BookmarkItem) -> Result<Value, Value> {
    serde_json::to_value(item).map_err(|e| error_value(&BookmarkError::Persistence(e.to_string())))
}

fn list_value(items: &[BookmarkItem]) -> Result<Value, Value> {
    let values = items.iter().map(item_value).collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "count": values.len(),
        "message": format!("Found {} items.", values.len()),
        "value": values,
    }))
}

fn settings_error_value(err: &SettingsError) -> Value {
    json!({"kind": "settings", "message": err.to_string()})
}

fn settings_value(app: &App) -> Result<Value, Value> {
    serde_json::to_value(app.settings_engine.get_settings())
        .map_err(|e| settings_error_value(&SettingsError::SerializationError(e.to_string())))
}

/// `settings.*` methods. Returns `None` for any other method.
///
/// `settings.validation` merges the given keys into the current field limits.
fn settings_method(app: &mut App, method: &str, params: &Value) -> Option<Result<Value, Value>> {
    let result = match method {
        "settings.get" => settings_value(app),
        "settings.validation" => {
            let changes = match params.as_object() {
                Some(changes) => changes,
                None => return Some(Err(invalid("params must be an object"))),
            };
            let mut settings = app.settings_engine.get_settings().clone();
            let mut merged = match serde_json::to_value(&settings.validation) {
                Ok(Value::Object(current)) => current,
                _ => serde_json::Map::new(),
            };
            merged.extend(changes.iter().map(|(k, v)| (k.clone(), v.clone())));
            match serde_json::from_value::<ValidationSettings>(Value::Object(merged)) {
                Ok(validation) => {
                    settings.validation = validation;
                    app.apply_settings(settings)
                        .map_err(|e| settings_error_value(&e))
                        .and_then(|_| settings_value(app))
                }
                Err(e) => Err(invalid(&format!("invalid validation settings: {}", e))),
            }
        }
        "settings.reset" => app
            .reset_settings()
            .map_err(|e| settings_error_value(&e))
            .and_then(|_| settings_value(app)),
        _ => return None,
    };
    Some(result)
}

/// Dispatch a JSON-RPC method call on behalf of `username`.
///
/// Returns `Ok(Value)` on success or `Err(Value)` holding `{"kind", "message"}`.
pub fn handle_method(app: &Mutex<App>, username: &str, method: &str, params: &Value) -> Result<Value, Value> {
    if method == "ping" {
        return Ok(json!({"pong": true}));
    }
    if username.is_empty() {
        return Err(invalid("cannot use empty Username"));
    }

    let mut a = app
        .lock()
        .map_err(|e| error_value(&BookmarkError::Persistence(e.to_string())))?;
    if let Some(result) = settings_method(&mut a, method, params) {
        return result;
    }
    let mut mgr = BookmarkManager::new(a.db.connection());
    tracing::debug!(method, user = username, "handling rpc method");

    let fail = |err: BookmarkError| {
        tracing::warn!(method, user = username, error = %err, "rpc method failed");
        error_value(&err)
    };

    match method {
        "bookmarks.create" => {
            let req: BookmarkRequest = serde_json::from_value(params.clone())
                .map_err(|e| invalid(&format!("invalid request: {}", e)))?;
            let mut item = BookmarkItem {
                sort_order: req.sort_order,
                item_type: req.item_type,
                favicon: req.favicon,
                ..BookmarkItem::node(username, &req.path, &req.display_name, &req.url)
            };
            a.validator.validate_item(&mut item).map_err(fail)?;
            let exists = |path: &str, name: &str| mgr.get_folder_by_path_name(path, name, username).is_ok();
            validate_path(&item.path, &exists).map_err(fail)?;
            let created = mgr.create(item).map_err(fail)?;
            item_value(&created)
        }
        "bookmarks.update" => {
            let req: BookmarkRequest = serde_json::from_value(params.clone())
                .map_err(|e| invalid(&format!("invalid request: {}", e)))?;
            let id = req.id.clone().filter(|id| !id.is_empty()).ok_or_else(|| invalid("missing id parameter"))?;
            let existing = mgr.get_by_id(&id, username).map_err(fail)?;
            let mut item = BookmarkItem {
                id,
                path: req.path,
                display_name: req.display_name,
                url: req.url,
                sort_order: req.sort_order,
                favicon: req.favicon,
                ..existing.clone()
            };
            a.validator.validate_item(&mut item).map_err(fail)?;
            if item.path != existing.path {
                let exists = |path: &str, name: &str| mgr.get_folder_by_path_name(path, name, username).is_ok();
                validate_path(&item.path, &exists).map_err(fail)?;
            }
            let updated = mgr.update(item).map_err(fail)?;
            item_value(&updated)
        }
        "bookmarks.get" => {
            let id = str_param(params, "id")?;
            let item = mgr.get_by_id(id, username).map_err(fail)?;
            item_value(&item)
        }
        "bookmarks.all" => {
            let items = mgr.get_all(username).map_err(fail)?;
            list_value(&items)
        }
        "bookmarks.bypath" => {
            let path = str_param(params, "path")?;
            let items = mgr.get_by_path(path, username).map_err(fail)?;
            list_value(&items)
        }
        "bookmarks.allpath" => {
            let path = str_param(params, "path")?;
            let items = mgr.get_by_path_prefix(path, username).map_err(fail)?;
            list_value(&items)
        }
        "bookmarks.byname" => {
            let name = str_param(params, "name")?;
            let items = mgr.get_by_name(name, username).map_err(fail)?;
            list_value(&items)
        }
        "bookmarks.folder" => {
            let path = str_param(params, "path")?;
            let folder = mgr.get_folder_by_full_path(path, username).map_err(fail)?;
            item_value(&folder)
        }
        "bookmarks.mostvisited" => {
            let num = match params.get("num") {
                None | Some(Value::Null) => 0,
                Some(v) => v.as_i64().ok_or_else(|| invalid("num must be an integer"))?,
            };
            let items = mgr.get_most_visited(username, num).map_err(fail)?;
            list_value(&items)
        }
        "bookmarks.fetch" => {
            let id = str_param(params, "id")?;
            let item = mgr.get_by_id(id, username).map_err(fail)?;
            if item.is_folder() {
                return Err(invalid("cannot fetch a folder"));
            }
            let item = mgr.record_access(id, username).map_err(fail)?;
            Ok(json!({"id": item.id, "url": item.url, "accessCount": item.access_count}))
        }
        "bookmarks.delete" => {
            let id = str_param(params, "id")?;
            let item = mgr.get_by_id(id, username).map_err(fail)?;
            let full_path = item.full_path();
            let has_children = item.is_folder() && !mgr.get_by_path(&full_path, username).map_err(fail)?.is_empty();
            let deleted = if has_children {
                mgr.delete_path(&full_path, username).map_err(fail)?
            } else {
                mgr.delete(id, username).map_err(fail)?;
                1
            };
            Ok(json!({"ok": true, "deleted": deleted}))
        }
        "bookmarks.childcount" => {
            let path = params.get("path").and_then(|v| v.as_str()).unwrap_or("/");
            let counts = mgr.path_child_count(path, username).map_err(fail)?;
            Ok(json!(counts))
        }
        "bookmarks.reconcile" => {
            let fixed = mgr.reconcile_child_counts(username).map_err(fail)?;
            Ok(json!({"fixed": fixed}))
        }
        _ => Err(json!({"kind": "unknown_method", "message": format!("unknown method: {}", method)})),
    }
}
