// Bookmarks services
// Stateless helpers: path handling, validation and settings.

pub mod hierarchy_validator;
pub mod item_validator;
pub mod path_model;
pub mod settings_engine;
