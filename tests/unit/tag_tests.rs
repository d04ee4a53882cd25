//! Unit tests for the attribute and relationship tag grammars

use pretty_assertions::assert_eq;

use schemagen::tags::rules::{
    check_column_attributes, check_default_value, parse_enum_values, validate_check_constraint,
    validate_column_type, Severity,
};
use schemagen::tags::{
    AttributeSet, DependentAction, RelationKind, Relationship, RelationshipDescriptor,
    TagParseError, TagParser,
};

// ============================================================================
// Attribute Grammar Tests
// ============================================================================

#[test]
fn test_attribute_tag_with_flag_and_values() {
    let set = AttributeSet::parse("type:varchar(255);unique;default:'active'");

    let entries: Vec<(&str, &str)> = set.iter().collect();
    assert_eq!(
        entries,
        vec![("default", "'active'"), ("type", "varchar(255)"), ("unique", "")]
    );
}

#[test]
fn test_attribute_value_keeps_later_colons() {
    let set = AttributeSet::parse("default:'12:30:00'::time");
    assert_eq!(set.get("default"), Some("'12:30:00'::time"));
}

#[test]
fn test_attribute_repeated_key_accumulates() {
    let set = AttributeSet::parse("index:idx_a; index:idx_b ;;primary_key");
    assert_eq!(set.values("index").collect::<Vec<_>>(), vec!["idx_a", "idx_b"]);
    assert!(set.has("primary_key"));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_attribute_parse_is_idempotent_through_cache() {
    let raw = "primary_key;column:user_id;type:bigint";
    let mut parser = TagParser::new();

    let uncached = AttributeSet::parse(raw);
    let first = parser.parse_attributes(raw);
    let second = parser.parse_attributes(raw);

    assert_eq!(first, uncached);
    assert_eq!(second, uncached);
    assert_eq!(parser.stats().hits, 1);
    assert_eq!(parser.stats().misses, 1);
}

// ============================================================================
// Attribute Semantic Rules
// ============================================================================

#[test]
fn test_column_type_allow_list() {
    assert!(validate_column_type("varchar(255)").is_ok());
    assert!(validate_column_type("DECIMAL(10, 2)").is_ok());
    assert!(validate_column_type("integer[]").is_ok());
    assert!(validate_column_type("varchar()").is_err());
    assert!(validate_column_type("varchar(10").is_err());
    assert!(validate_column_type("money_bag").is_err());
}

#[test]
fn test_default_value_warnings() {
    assert_eq!(check_default_value("0"), None);
    assert_eq!(check_default_value("'pending'"), None);
    assert_eq!(check_default_value("now()"), None);
    assert_eq!(check_default_value("CURRENT_TIMESTAMP"), None);
    assert!(check_default_value("pending").is_some());
}

#[test]
fn test_check_constraint_shapes() {
    assert!(validate_check_constraint("status IN ('a', 'b')").is_ok());
    assert!(validate_check_constraint("age BETWEEN 0 AND 150").is_ok());
    assert!(validate_check_constraint("char_length(name) > 2").is_ok());
    assert!(validate_check_constraint("status IN ()").is_err());
    assert!(validate_check_constraint("status IN (a, b)").is_err());
    assert!(validate_check_constraint("age BETWEEN 0").is_err());
    assert!(validate_check_constraint("length(name)").is_err());
    assert!(validate_check_constraint("(age > 0").is_err());
}

#[test]
fn test_enum_values() {
    assert_eq!(
        parse_enum_values("draft, published").unwrap(),
        vec!["draft".to_string(), "published".to_string()]
    );
    assert!(parse_enum_values("").is_err());
    assert!(parse_enum_values("a,a").is_err());
    assert!(parse_enum_values("ok,not ok").is_err());
}

#[test]
fn test_unknown_key_is_warning_only() {
    let diagnostics = check_column_attributes(&AttributeSet::parse("primary_key;sparkly"));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].key, "sparkly");
}

#[test]
fn test_conflicting_nullability_is_error() {
    let diagnostics = check_column_attributes(&AttributeSet::parse("null;not_null"));
    assert!(diagnostics
        .iter()
        .any(|d| d.severity == Severity::Error && d.message.contains("mutually exclusive")));
}

// ============================================================================
// Relationship Grammar Tests
// ============================================================================

#[test]
fn test_belongs_to_defaults() {
    for (target, fk) in [
        ("User", "user_id"),
        ("BlogPost", "blog_post_id"),
        ("HTTPEndpoint", "http_endpoint_id"),
    ] {
        let d = RelationshipDescriptor::parse(&format!("belongs_to:{}", target)).unwrap();
        assert_eq!(
            d.relation,
            Relationship::BelongsTo {
                target: target.to_string(),
                foreign_key: fk.to_string(),
                target_key: "id".to_string(),
            }
        );
    }
}

#[test]
fn test_owning_relationships_require_foreign_key() {
    for (tag, kind) in [
        ("has_one:Profile", RelationKind::HasOne),
        ("has_many:Post", RelationKind::HasMany),
        ("has_many:Post,order_by:created_at", RelationKind::HasMany),
    ] {
        assert_eq!(
            RelationshipDescriptor::parse(tag).unwrap_err(),
            TagParseError::MissingRequiredField {
                kind,
                field: "foreign_key"
            },
            "{}",
            tag
        );
    }
}

#[test]
fn test_has_many_with_options() {
    let d = RelationshipDescriptor::parse(
        "has_many:Comment, foreign_key:post_id, order_by:created_at DESC, dependent:nullify, no_validate, autosave",
    )
    .unwrap();

    assert_eq!(d.kind(), RelationKind::HasMany);
    assert_eq!(d.relation.foreign_key(), Some("post_id"));
    assert_eq!(d.options.order_by.as_deref(), Some("created_at DESC"));
    assert_eq!(d.options.dependent, Some(DependentAction::Nullify));
    assert_eq!(d.options.validate, Some(false));
    assert_eq!(d.options.autosave, Some(true));
}

#[test]
fn test_many_to_many_requires_join_fields() {
    let err = RelationshipDescriptor::parse("many_to_many:Tag,join_table:post_tags").unwrap_err();
    assert_eq!(
        err,
        TagParseError::MissingRequiredField {
            kind: RelationKind::ManyToMany,
            field: "join_source_key"
        }
    );

    let d = RelationshipDescriptor::parse(
        "has_many_through:Tag,join_table:post_tags,join_source_key:post_id,join_target_key:tag_id",
    )
    .unwrap();
    assert_eq!(d.kind(), RelationKind::ManyToMany);
    assert_eq!(d.target(), "Tag");
}

#[test]
fn test_relationship_parse_errors() {
    assert_eq!(RelationshipDescriptor::parse("").unwrap_err(), TagParseError::EmptyTag);
    assert!(matches!(
        RelationshipDescriptor::parse("User").unwrap_err(),
        TagParseError::MissingKind { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("owns:User").unwrap_err(),
        TagParseError::UnknownKind { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("belongs_to:").unwrap_err(),
        TagParseError::MissingTarget { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("belongs_to:User,lazy").unwrap_err(),
        TagParseError::UnknownToken { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("belongs_to:User,foreign_key:").unwrap_err(),
        TagParseError::MalformedOption { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("belongs_to:User,eager:true").unwrap_err(),
        TagParseError::UnknownOption { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("belongs_to:User,validate,no_validate").unwrap_err(),
        TagParseError::DuplicateOption { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("belongs_to:User,join_table:x").unwrap_err(),
        TagParseError::OptionNotApplicable { .. }
    ));
    assert!(matches!(
        RelationshipDescriptor::parse("has_many:Post,foreign_key:user_id,dependent:explode")
            .unwrap_err(),
        TagParseError::InvalidOptionValue { .. }
    ));
}

#[test]
fn test_relationship_errors_not_cached() {
    let mut parser = TagParser::new();
    assert!(parser.parse_relationship("has_many:Post").is_err());
    assert!(parser.parse_relationship("has_many:Post").is_err());
    assert_eq!(parser.cached_len(), 0);

    let first = parser.parse_relationship("belongs_to:User").unwrap();
    let second = parser.parse_relationship("belongs_to:User").unwrap();
    assert_eq!(first, second);
    assert_eq!(parser.cached_len(), 1);
}
