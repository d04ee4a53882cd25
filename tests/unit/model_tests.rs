//! Unit tests for scanning declarations and building entity metadata

use std::path::Path;

use pretty_assertions::assert_eq;

use schemagen::model::{build_model, ConstraintKind, IndexMetadata, ModelRegistry};
use schemagen::scanner::{is_test_file, resolve_type, scan_source, DeclarationFact};
use schemagen::tags::{RelationKind, TagParser};
use schemagen::SchemaGenError;

/// Helper to scan a source string and keep the entity declarations
fn scan_entities(src: &str) -> Vec<DeclarationFact> {
    scan_source(src, Path::new("models.rs"))
        .unwrap()
        .into_iter()
        .map(|d| d.unwrap())
        .filter(DeclarationFact::is_entity)
        .collect()
}

/// Helper to scan and build a registry
fn build(src: &str) -> ModelRegistry {
    build_model(&scan_entities(src), &mut TagParser::new()).unwrap()
}

// ============================================================================
// Scanner Tests
// ============================================================================

#[test]
fn test_helper_types_are_not_entities() {
    let decls = scan_source(
        r#"
pub struct Point { pub x: f64, pub y: f64 }
pub struct Tagged { #[db = "primary_key"] pub id: i64 }
#[db = "table:settings"]
pub struct Settings { pub value: String }
"#,
        Path::new("models.rs"),
    )
    .unwrap();

    let classified: Vec<(String, bool)> = decls
        .into_iter()
        .map(|d| d.unwrap())
        .map(|d| (d.name.clone(), d.is_entity()))
        .collect();
    assert_eq!(
        classified,
        vec![
            ("Point".to_string(), false),
            ("Tagged".to_string(), true),
            ("Settings".to_string(), true),
        ]
    );
}

#[test]
fn test_type_resolution_flags() {
    let cases = [
        ("i64", "i64", false, false),
        ("Option<String>", "String", true, false),
        ("Vec<Comment>", "Comment", false, true),
        ("Vec<Box<Comment>>", "Comment", true, true),
        ("Option<Vec<Tag>>", "Tag", true, true),
        ("&'static [u8]", "u8", true, true),
        ("chrono::DateTime<chrono::Utc>", "chrono::DateTime", false, false),
        ("Arc<std::sync::Mutex<Counter>>", "std::sync::Mutex", true, false),
    ];
    for (src, base, pointer, collection) in cases {
        let ty: syn::Type = syn::parse_str(src).unwrap();
        let resolved = resolve_type(&ty);
        assert_eq!(resolved.base, base, "{}", src);
        assert_eq!(resolved.is_pointer, pointer, "{}", src);
        assert_eq!(resolved.is_collection, collection, "{}", src);
    }
}

#[test]
fn test_test_file_detection() {
    assert!(is_test_file(Path::new("src/user_test.rs")));
    assert!(is_test_file(Path::new("src/user_tests.rs")));
    assert!(is_test_file(Path::new("tests.rs")));
    assert!(!is_test_file(Path::new("src/contest.rs")));
    assert!(!is_test_file(Path::new("src/testing.rs")));
}

#[test]
fn test_malformed_attribute_skips_only_that_declaration() {
    let decls = scan_source(
        r#"
pub struct Broken { #[db(primary_key)] pub id: i64 }
pub struct Fine { #[db = "primary_key"] pub id: i64 }
"#,
        Path::new("models.rs"),
    )
    .unwrap();

    assert_eq!(decls.len(), 2);
    assert!(decls[0].is_err());
    assert_eq!(decls[1].as_ref().unwrap().name, "Fine");
}

// ============================================================================
// Entity Builder Tests
// ============================================================================

#[test]
fn test_explicit_table_with_primary_key() {
    let registry = build(
        r#"
#[db = "table:users"]
pub struct Account {
    #[db = "primary_key"]
    pub id: i32,
    pub name: String,
}
"#,
    );

    let entity = registry.get("Account").unwrap();
    assert_eq!(entity.table_name, "users");
    assert!(entity.table_name_explicit);
    assert_eq!(entity.primary_keys, vec!["id".to_string()]);
    assert_eq!(entity.columns.len(), 2);
}

#[test]
fn test_columns_keep_declaration_order_and_skip_relationships() {
    let registry = build(
        r#"
pub struct Post {
    #[db = "primary_key"]
    pub id: i64,
    #[rel = "belongs_to:User"]
    pub user: Option<User>,
    pub user_id: i64,
    #[db = "-"]
    pub cached_html: String,
    pub title: String,
    draft_notes: String,
}
"#,
    );

    let post = registry.get("Post").unwrap();
    assert_eq!(post.column_names().collect::<Vec<_>>(), vec!["id", "user_id", "title"]);
    assert_eq!(post.relationships.len(), 1);
    assert_eq!(post.relationships[0].descriptor.kind(), RelationKind::BelongsTo);
    assert_eq!(post.relationships[0].target_table, None);
    assert_eq!(post.table_name, "posts");
    assert!(!post.table_name_explicit);
}

#[test]
fn test_column_derivation() {
    let registry = build(
        r#"
pub struct Profile {
    #[db = "primary_key;column:profile_id;auto_increment"]
    pub id: i64,
    #[db = "size:80;unique"]
    pub display_name: String,
    pub bio: Option<String>,
    #[db = "not_null"]
    pub avatar: Option<String>,
    #[db = "type:citext;null"]
    pub email: String,
    pub labels: Vec<String>,
    #[db = "default:0"]
    pub visits: u64,
    pub joined: chrono::NaiveDateTime,
}
"#,
    );

    let p = registry.get("Profile").unwrap();
    let summary: Vec<(&str, &str, bool)> = p
        .columns
        .iter()
        .map(|c| (c.column_name.as_str(), c.sql_type.as_str(), c.is_nullable))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("profile_id", "bigint", false),
            ("display_name", "varchar(80)", false),
            ("bio", "text", true),
            ("avatar", "text", false),
            ("email", "citext", true),
            ("labels", "jsonb", false),
            ("visits", "bigint", false),
            ("joined", "timestamp", false),
        ]
    );

    assert_eq!(p.primary_keys, vec!["profile_id".to_string()]);
    assert!(p.column("profile_id").unwrap().is_auto_increment);
    assert!(p.column("display_name").unwrap().is_unique);
    assert!(p.column("email").unwrap().type_override);
    assert_eq!(p.column("visits").unwrap().default_value.as_deref(), Some("0"));
}

#[test]
fn test_indexes_and_constraints() {
    let registry = build(
        r#"
#[db = "table:orders;index:(customer_id,placed_at);check:total >= 0"]
pub struct Order {
    #[db = "primary_key"]
    pub id: i64,
    #[db = "foreign_key:customers.id;index"]
    pub customer_id: i64,
    #[db = "index:idx_orders_region_status"]
    pub region: String,
    #[db = "index:idx_orders_region_status;enum:open,paid,shipped"]
    pub status: String,
    pub placed_at: chrono::NaiveDateTime,
    pub total: i64,
}
"#,
    );

    let order = registry.get("Order").unwrap();
    assert_eq!(
        order.indexes,
        vec![
            IndexMetadata {
                name: "idx_orders_customer_id".to_string(),
                columns: vec!["customer_id".to_string()],
                is_unique: false,
            },
            IndexMetadata {
                name: "idx_orders_region_status".to_string(),
                columns: vec!["region".to_string(), "status".to_string()],
                is_unique: false,
            },
            IndexMetadata {
                name: "idx_orders_customer_id_placed_at".to_string(),
                columns: vec!["customer_id".to_string(), "placed_at".to_string()],
                is_unique: false,
            },
        ]
    );

    let names: Vec<&str> = order.constraints.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["fk_orders_customer_id", "enum_orders_status", "chk_orders"]
    );
    assert!(matches!(
        &order.constraints[2].kind,
        ConstraintKind::Check { column: None, expression } if expression == "total >= 0"
    ));
    assert_eq!(order.column("status").unwrap().sql_type, "text");

    let customer = order.column("customer_id").unwrap();
    let fk = customer.foreign_key.as_ref().unwrap();
    assert_eq!((fk.table.as_str(), fk.column.as_str()), ("customers", "id"));
    assert_eq!(customer.attributes.value("foreign_key"), Some("customers.id"));
}

#[test]
fn test_repeated_db_attributes_accumulate() {
    let registry = build(
        r#"
pub struct Item {
    #[db = "primary_key"]
    #[db = "column:item_id"]
    pub id: i64,
}
"#,
    );
    assert_eq!(registry.get("Item").unwrap().primary_keys, vec!["item_id".to_string()]);
}

#[test]
fn test_relationship_parse_error_names_field_and_tag() {
    let decls = scan_entities(
        r#"
pub struct User {
    #[db = "primary_key"]
    pub id: i64,
    #[rel = "has_many:Post"]
    pub posts: Vec<Post>,
}
"#,
    );
    let err = build_model(&decls, &mut TagParser::new()).unwrap_err();

    match err.downcast_ref::<SchemaGenError>() {
        Some(SchemaGenError::TagParseError {
            entity, field, tag, ..
        }) => {
            assert_eq!(entity, "User");
            assert_eq!(field, "posts");
            assert_eq!(tag, "has_many:Post");
        }
        other => panic!("expected TagParseError, got {:?}", other),
    }
    assert!(err.to_string().contains("requires `foreign_key`"));
}

#[test]
fn test_duplicate_entity_name_fails() {
    let mut decls = scan_entities(r#"pub struct User { #[db = "primary_key"] pub id: i64 }"#);
    let mut other = decls[0].clone();
    other.source_file = "other.rs".into();
    decls.push(other);

    let err = build_model(&decls, &mut TagParser::new()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchemaGenError>(),
        Some(SchemaGenError::DuplicateEntity { name, .. }) if name == "User"
    ));
}

#[test]
fn test_identical_tags_parse_once() {
    let decls = scan_entities(
        r#"
pub struct A { #[db = "primary_key"] pub id: i64, #[db = "not_null"] pub x: Option<i32> }
pub struct B { #[db = "primary_key"] pub id: i64, #[db = "not_null"] pub y: Option<i32> }
"#,
    );
    let mut parser = TagParser::new();
    build_model(&decls, &mut parser).unwrap();

    assert_eq!(parser.stats().misses, 2);
    assert_eq!(parser.stats().hits, 2);
}
