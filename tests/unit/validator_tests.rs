//! Unit tests for model validation

use std::path::Path;

use pretty_assertions::assert_eq;

use schemagen::model::{build_model, ModelRegistry};
use schemagen::scanner::{scan_source, DeclarationFact};
use schemagen::tags::TagParser;
use schemagen::validate::{validate_model, ValidationReport};

fn build(src: &str) -> ModelRegistry {
    let decls: Vec<DeclarationFact> = scan_source(src, Path::new("models.rs"))
        .unwrap()
        .into_iter()
        .map(|d| d.unwrap())
        .filter(DeclarationFact::is_entity)
        .collect();
    build_model(&decls, &mut TagParser::new()).unwrap()
}

fn validate(src: &str) -> ValidationReport {
    validate_model(&build(src))
}

fn error_messages(report: &ValidationReport) -> Vec<String> {
    report.errors.iter().map(|e| e.to_string()).collect()
}

// ============================================================================
// Per-Entity Checks
// ============================================================================

#[test]
fn test_missing_primary_key_reported_once() {
    let report = validate(
        r#"
pub struct Note {
    #[db = "column:note_body"]
    pub body: String,
    #[db = "unique"]
    pub slug: String,
    pub title: String,
}
"#,
    );

    assert!(!report.is_valid());
    assert_eq!(error_messages(&report), vec!["Note: no primary key defined"]);
}

#[test]
fn test_belongs_to_requires_local_foreign_key() {
    let report = validate(
        r#"
pub struct User { #[db = "primary_key"] pub id: i64 }
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    #[rel = "belongs_to:User"]
    pub user: Option<User>,
}
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["Post.user: foreign key column `user_id` not found on Post"]
    );
}

#[test]
fn test_belongs_to_target_key_checked_on_target() {
    let report = validate(
        r#"
pub struct User { #[db = "primary_key"] pub uuid: String }
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    pub user_id: i64,
    #[rel = "belongs_to:User"]
    pub user: Option<User>,
}
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["Post.user: target key column `id` not found on User"]
    );
}

#[test]
fn test_has_many_keys_checked_on_correct_sides() {
    let report = validate(
        r#"
pub struct User {
    #[db = "primary_key;column:user_key"]
    pub id: i64,
    #[rel = "has_many:Post,foreign_key:owner_id"]
    pub posts: Vec<Post>,
}
pub struct Post { #[db = "primary_key"] pub id: i64 }
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec![
            "User.posts: foreign key column `owner_id` not found on Post",
            "User.posts: source key column `id` not found on User",
        ]
    );
}

#[test]
fn test_missing_target_does_not_stop_validation() {
    let report = validate(
        r#"
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    #[rel = "belongs_to:Ghost"]
    pub ghost: Option<Ghost>,
    #[rel = "belongs_to:Phantom"]
    pub phantom: Option<Phantom>,
}
pub struct Draft { pub text: String, #[db = "unique"] pub slug: String }
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec![
            "Post.ghost: relationship target `Ghost` not found",
            "Post.phantom: relationship target `Phantom` not found",
            "Draft: no primary key defined",
        ]
    );
}

#[test]
fn test_join_table_columns_not_verified() {
    let report = validate(
        r#"
pub struct Tag { #[db = "primary_key"] pub id: i64 }
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    #[rel = "many_to_many:Tag,join_table:no_such_table,join_source_key:a,join_target_key:b"]
    pub tags: Vec<Tag>,
}
"#,
    );

    assert!(report.is_valid(), "{}", report);
}

#[test]
fn test_relationship_shape_warnings() {
    let report = validate(
        r#"
pub struct User { #[db = "primary_key"] pub id: i64 }
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    pub user_id: i64,
    #[rel = "belongs_to:User"]
    pub user: Vec<Account>,
}
"#,
    );

    assert!(report.is_valid());
    let warnings: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
    assert_eq!(
        warnings,
        vec![
            "Post.user: belongs_to field is a collection",
            "Post.user: field type `Account` differs from relationship target `User`",
        ]
    );
}

// ============================================================================
// Attribute Checks
// ============================================================================

#[test]
fn test_attribute_errors_and_warnings_collected() {
    let report = validate(
        r#"
pub struct Event {
    #[db = "primary_key;type:bigserial"]
    pub id: i64,
    #[db = "type:varchr(20)"]
    pub code: String,
    #[db = "check:kind IN ()"]
    pub kind: String,
    #[db = "default:soon;shiny"]
    pub starts_at: String,
}
"#,
    );

    assert_eq!(report.errors.len(), 2);
    assert_eq!(report.errors[0].field, "code");
    assert_eq!(report.errors[1].field, "kind");
    assert_eq!(report.warnings.len(), 2);
    assert!(report.warnings.iter().all(|w| w.field == "starts_at"));
}

#[test]
fn test_foreign_key_targets() {
    let report = validate(
        r#"
pub struct User { #[db = "primary_key"] pub id: i64 }
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    #[db = "foreign_key:users.uuid"]
    pub user_id: i64,
    #[db = "foreign_key:legacy_accounts.id"]
    pub account_id: i64,
}
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["Post.user_id: foreign key references unknown column `users.uuid`"]
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, "account_id");
}

#[test]
fn test_table_index_columns_must_exist() {
    let report = validate(
        r#"
#[db = "unique_index:uq_pair(left_id,right_id)"]
pub struct Pair {
    #[db = "primary_key"]
    pub id: i64,
    pub left_id: i64,
}
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["Pair: unique_index references unknown column `right_id`"]
    );
}

#[test]
fn test_duplicate_column_names() {
    let report = validate(
        r#"
pub struct Doc {
    #[db = "primary_key"]
    pub id: i64,
    #[db = "column:id"]
    pub legacy_id: i64,
}
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["Doc.legacy_id: duplicate column name `id`"]
    );
}

// ============================================================================
// Cross-Entity Checks
// ============================================================================

#[test]
fn test_duplicate_table_reported_once_naming_both() {
    let report = validate(
        r#"
#[db = "table:users"]
pub struct User { #[db = "primary_key"] pub id: i64 }
#[db = "table:users"]
pub struct Account { #[db = "primary_key"] pub id: i64 }
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["User: duplicate table name `users` declared by User, Account"]
    );
}

#[test]
fn test_entities_sharing_module_name_reported_once() {
    let report = validate(
        r#"
#[db = "table:http_requests"]
pub struct HttpRequest { #[db = "primary_key"] pub id: i64 }
#[db = "table:legacy_requests"]
pub struct HTTPRequest { #[db = "primary_key"] pub id: i64 }
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec![
            "HttpRequest: duplicate module name `http_request` derived from HttpRequest, HTTPRequest"
        ]
    );
}

#[test]
fn test_derived_table_name_shape_suggests_table_tag() {
    let report = validate(
        r#"
pub struct Café { #[db = "primary_key"] pub id: i64 }
"#,
    );

    assert_eq!(
        error_messages(&report),
        vec!["Café: invalid table name `cafés` derived from `Café`: declare one with `table:`"]
    );
}

#[test]
fn test_invalid_table_name_shape() {
    let report = validate(
        r#"
#[db = "table:Bad__Name"]
pub struct Thing { #[db = "primary_key"] pub id: i64 }
"#,
    );

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].message.starts_with("invalid table name `Bad__Name`"));
}

#[test]
fn test_report_lines_order_errors_first() {
    let report = validate(
        r#"
pub struct Event {
    #[db = "default:soon"]
    pub starts_at: String,
}
"#,
    );

    let lines = report.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("error: Event: no primary key defined"));
    assert!(lines[1].starts_with("warning: Event.starts_at:"));
}
