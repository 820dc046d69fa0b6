//! Unit tests for field-level validation of bookmark items.

use bookmarks::services::item_validator::ItemValidator;
use bookmarks::types::bookmark::BookmarkItem;
use bookmarks::types::errors::BookmarkError;
use bookmarks::types::settings::ValidationSettings;
use rstest::rstest;

#[rstest]
#[case("Rust")]
#[case("My Links 2024")]
#[case("a.b-c_d")]
#[case("Ünïcödé")]
fn test_valid_display_names(#[case] name: &str) {
    let validator = ItemValidator::default();
    assert!(validator.validate_display_name(name).is_ok(), "'{name}' should be accepted");
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("A/B")]
#[case("<script>")]
#[case("Tom & Jerry")]
#[case("say \"hi\"")]
#[case("it's")]
#[case("back\\slash")]
fn test_invalid_display_names(#[case] name: &str) {
    let validator = ItemValidator::default();
    let err = validator.validate_display_name(name).unwrap_err();
    assert!(matches!(err, BookmarkError::Validation(_)), "'{name}' should be rejected");
}

#[test]
fn test_display_name_length_limit() {
    let validator = ItemValidator::new(ValidationSettings {
        max_display_name_len: 4,
        ..ValidationSettings::default()
    });
    assert!(validator.validate_display_name("abcd").is_ok());
    assert!(validator.validate_display_name("abcde").is_err());
}

#[test]
fn test_configured_blacklist_is_used() {
    let validator = ItemValidator::new(ValidationSettings {
        invalid_chars: "#".to_string(),
        ..ValidationSettings::default()
    });
    assert!(validator.validate_display_name("a#b").is_err());
    assert!(validator.validate_display_name("a<b").is_ok());
}

#[rstest]
#[case("/", true)]
#[case("/A", true)]
#[case("/A/B", true)]
#[case("", false)]
#[case("A", false)]
#[case("/A/", false)]
fn test_path_rules(#[case] path: &str, #[case] ok: bool) {
    let validator = ItemValidator::default();
    assert_eq!(validator.validate_path(path).is_ok(), ok, "path '{path}'");
}

#[test]
fn test_node_requires_url() {
    let validator = ItemValidator::default();
    let mut item = BookmarkItem::node("alice", "/", "Rust", "");
    assert!(matches!(validator.validate_item(&mut item), Err(BookmarkError::Validation(_))));
}

#[test]
fn test_folder_url_is_cleared() {
    let validator = ItemValidator::default();
    let mut item = BookmarkItem::folder("alice", "/", "Work");
    item.url = "http://ignored".to_string();
    validator.validate_item(&mut item).unwrap();
    assert_eq!(item.url, "");
}

#[test]
fn test_empty_username_is_rejected() {
    let validator = ItemValidator::default();
    let mut item = BookmarkItem::node("", "/", "Rust", "https://rust-lang.org");
    assert!(validator.validate_item(&mut item).is_err());
}
