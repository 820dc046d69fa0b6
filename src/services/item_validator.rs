// Bookmarks Item Validator
// Field-level checks run before an item reaches the store.

use crate::services::path_model;
use crate::types::bookmark::{BookmarkItem, ItemType};
use crate::types::errors::BookmarkError;
use crate::types::settings::ValidationSettings;

/// Checks the user supplied fields of bookmark items.
pub struct ItemValidator {
    rules: ValidationSettings,
}

impl ItemValidator {
    pub fn new(rules: ValidationSettings) -> Self {
        Self { rules }
    }

    /// Display names are a single path segment: non-empty, no `/`, none of
    /// the configured invalid characters.
    pub fn validate_display_name(&self, name: &str) -> Result<(), BookmarkError> {
        if name.trim().is_empty() {
            return Err(BookmarkError::Validation("displayName: cannot be empty".to_string()));
        }
        if name.chars().count() > self.rules.max_display_name_len {
            return Err(BookmarkError::Validation(format!(
                "displayName: longer than {} characters",
                self.rules.max_display_name_len
            )));
        }
        if let Some(c) = name
            .chars()
            .find(|c| *c == path_model::SEPARATOR || self.rules.invalid_chars.contains(*c))
        {
            return Err(BookmarkError::Validation(format!(
                "displayName: character '{}' is not allowed",
                c
            )));
        }
        Ok(())
    }

    pub fn validate_path(&self, path: &str) -> Result<(), BookmarkError> {
        if !path_model::is_well_formed(path) {
            return Err(BookmarkError::Validation(format!(
                "path: '{}' is not a valid path",
                path
            )));
        }
        if path.chars().count() > self.rules.max_path_len {
            return Err(BookmarkError::Validation(format!(
                "path: longer than {} characters",
                self.rules.max_path_len
            )));
        }
        Ok(())
    }

    /// Validates an item and normalizes it in place: folders never carry a URL.
    pub fn validate_item(&self, item: &mut BookmarkItem) -> Result<(), BookmarkError> {
        if item.user_name.is_empty() {
            return Err(BookmarkError::Validation("cannot use empty Username".to_string()));
        }
        self.validate_path(&item.path)?;
        self.validate_display_name(&item.display_name)?;

        match item.item_type {
            ItemType::Folder => item.url.clear(),
            ItemType::Node => {
                if item.url.trim().is_empty() {
                    return Err(BookmarkError::Validation("url: required for a bookmark".to_string()));
                }
                if item.url.chars().count() > self.rules.max_url_len {
                    return Err(BookmarkError::Validation(format!(
                        "url: longer than {} characters",
                        self.rules.max_url_len
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ItemValidator {
    fn default() -> Self {
        Self::new(ValidationSettings::default())
    }
}
