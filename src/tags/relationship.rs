//! Relationship tag grammar: `kind:Target,option:value,toggle`

use std::collections::HashMap;
use std::fmt;

use super::TagParseError;
use crate::naming::to_snake_case;

/// Key column assumed when a relationship does not name one.
pub const DEFAULT_IDENTITY_COLUMN: &str = "id";

const OPTION_KEYS: &[&str] = &[
    "foreign_key",
    "source_key",
    "target_key",
    "join_table",
    "join_source_key",
    "join_target_key",
    "order_by",
    "dependent",
    "polymorphic",
    "through",
    "conditions",
];

/// The four association shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// To-one, this entity holds the foreign key
    BelongsTo,
    /// To-one, the target holds the foreign key
    HasOne,
    /// To-many, the target holds the foreign key
    HasMany,
    /// To-many through a join table
    ManyToMany,
}

impl RelationKind {
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "belongs_to" => Some(RelationKind::BelongsTo),
            "has_one" => Some(RelationKind::HasOne),
            "has_many" => Some(RelationKind::HasMany),
            "many_to_many" | "has_many_through" => Some(RelationKind::ManyToMany),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::ManyToMany => "many_to_many",
        }
    }

    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::ManyToMany)
    }

    /// Option keys this kind accepts beyond the shared secondary options.
    fn key_options(&self) -> &'static [&'static str] {
        match self {
            RelationKind::BelongsTo => &["foreign_key", "target_key"],
            RelationKind::HasOne | RelationKind::HasMany => {
                &["foreign_key", "source_key", "through"]
            }
            RelationKind::ManyToMany => &[
                "join_table",
                "join_source_key",
                "join_target_key",
                "source_key",
                "target_key",
                "through",
            ],
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relationship with its kind-specific keys resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    BelongsTo {
        target: String,
        /// Column on this entity
        foreign_key: String,
        /// Column on the target
        target_key: String,
    },
    HasOne {
        target: String,
        /// Column on the target
        foreign_key: String,
        /// Column on this entity
        source_key: String,
    },
    HasMany {
        target: String,
        foreign_key: String,
        source_key: String,
    },
    ManyToMany {
        target: String,
        join_table: String,
        /// Join table column pointing at this entity
        join_source_key: String,
        /// Join table column pointing at the target
        join_target_key: String,
        source_key: String,
        target_key: String,
    },
}

impl Relationship {
    pub fn kind(&self) -> RelationKind {
        match self {
            Relationship::BelongsTo { .. } => RelationKind::BelongsTo,
            Relationship::HasOne { .. } => RelationKind::HasOne,
            Relationship::HasMany { .. } => RelationKind::HasMany,
            Relationship::ManyToMany { .. } => RelationKind::ManyToMany,
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Relationship::BelongsTo { target, .. }
            | Relationship::HasOne { target, .. }
            | Relationship::HasMany { target, .. }
            | Relationship::ManyToMany { target, .. } => target,
        }
    }

    pub fn foreign_key(&self) -> Option<&str> {
        match self {
            Relationship::BelongsTo { foreign_key, .. }
            | Relationship::HasOne { foreign_key, .. }
            | Relationship::HasMany { foreign_key, .. } => Some(foreign_key),
            Relationship::ManyToMany { .. } => None,
        }
    }
}

/// What happens to dependents when the owner is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentAction {
    Destroy,
    Delete,
    Nullify,
    Restrict,
}

impl DependentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependentAction::Destroy => "destroy",
            DependentAction::Delete => "delete",
            DependentAction::Nullify => "nullify",
            DependentAction::Restrict => "restrict",
        }
    }
}

impl std::str::FromStr for DependentAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "destroy" => Ok(DependentAction::Destroy),
            "delete" => Ok(DependentAction::Delete),
            "nullify" => Ok(DependentAction::Nullify),
            "restrict" => Ok(DependentAction::Restrict),
            _ => Err(format!("Unknown dependent action: {}", s)),
        }
    }
}

/// Secondary options shared by every kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationOptions {
    pub order_by: Option<String>,
    pub dependent: Option<DependentAction>,
    /// `validate` / `no_validate`; `None` when unspecified
    pub validate: Option<bool>,
    /// `autosave` / `no_autosave`; `None` when unspecified
    pub autosave: Option<bool>,
    pub polymorphic: Option<String>,
    pub through: Option<String>,
    pub conditions: Option<String>,
}

/// A fully parsed relationship tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    pub relation: Relationship,
    pub options: RelationOptions,
}

impl RelationshipDescriptor {
    /// Parse a relationship tag, filling kind-specific defaults and rejecting
    /// tags that omit a field with no safe default.
    pub fn parse(raw: &str) -> Result<Self, TagParseError> {
        let mut segments = raw.split(',').map(str::trim);

        let head = segments
            .next()
            .filter(|s| !s.is_empty())
            .ok_or(TagParseError::EmptyTag)?;
        let (kind_str, target) = head
            .split_once(':')
            .ok_or_else(|| TagParseError::MissingKind {
                segment: head.to_string(),
            })?;
        let kind = RelationKind::from_tag(kind_str.trim()).ok_or_else(|| {
            TagParseError::UnknownKind {
                kind: kind_str.trim().to_string(),
            }
        })?;
        let target = target.trim();
        if target.is_empty() {
            return Err(TagParseError::MissingTarget { kind });
        }

        let mut values: HashMap<&str, &str> = HashMap::new();
        let mut options = RelationOptions::default();

        for segment in segments.filter(|s| !s.is_empty()) {
            match segment.split_once(':') {
                Some((key, value)) => {
                    let (key, value) = (key.trim(), value.trim());
                    if key.is_empty() || value.is_empty() {
                        return Err(TagParseError::MalformedOption {
                            segment: segment.to_string(),
                        });
                    }
                    if !OPTION_KEYS.contains(&key) {
                        return Err(TagParseError::UnknownOption {
                            key: key.to_string(),
                        });
                    }
                    if values.insert(key, value).is_some() {
                        return Err(TagParseError::DuplicateOption {
                            key: key.to_string(),
                        });
                    }
                }
                None => {
                    let (slot, enabled) = match segment {
                        "validate" => (&mut options.validate, true),
                        "no_validate" => (&mut options.validate, false),
                        "autosave" => (&mut options.autosave, true),
                        "no_autosave" => (&mut options.autosave, false),
                        other => {
                            return Err(TagParseError::UnknownToken {
                                token: other.to_string(),
                            })
                        }
                    };
                    if slot.replace(enabled).is_some() {
                        return Err(TagParseError::DuplicateOption {
                            key: segment.trim_start_matches("no_").to_string(),
                        });
                    }
                }
            }
        }

        for key in values.keys() {
            let shared = matches!(
                *key,
                "order_by" | "dependent" | "polymorphic" | "conditions"
            );
            if !shared && !kind.key_options().contains(key) {
                return Err(TagParseError::OptionNotApplicable {
                    key: key.to_string(),
                    kind,
                });
            }
        }

        options.order_by = values.get("order_by").map(|v| v.to_string());
        options.polymorphic = values.get("polymorphic").map(|v| v.to_string());
        options.through = values.get("through").map(|v| v.to_string());
        options.conditions = values.get("conditions").map(|v| v.to_string());
        if let Some(dependent) = values.get("dependent") {
            options.dependent = Some(dependent.parse().map_err(|_| {
                TagParseError::InvalidOptionValue {
                    key: "dependent".to_string(),
                    value: dependent.to_string(),
                    expected: "destroy, delete, nullify or restrict",
                }
            })?);
        }

        let optional = |key: &str| values.get(key).map(|v| v.to_string());
        let required = |key: &'static str| {
            optional(key).ok_or(TagParseError::MissingRequiredField { kind, field: key })
        };
        let identity =
            |key: &str| optional(key).unwrap_or_else(|| DEFAULT_IDENTITY_COLUMN.to_string());

        let target = target.to_string();
        let relation = match kind {
            RelationKind::BelongsTo => Relationship::BelongsTo {
                foreign_key: optional("foreign_key")
                    .unwrap_or_else(|| format!("{}_id", to_snake_case(&target))),
                target_key: identity("target_key"),
                target,
            },
            RelationKind::HasOne => Relationship::HasOne {
                foreign_key: required("foreign_key")?,
                source_key: identity("source_key"),
                target,
            },
            RelationKind::HasMany => Relationship::HasMany {
                foreign_key: required("foreign_key")?,
                source_key: identity("source_key"),
                target,
            },
            RelationKind::ManyToMany => Relationship::ManyToMany {
                join_table: required("join_table")?,
                join_source_key: required("join_source_key")?,
                join_target_key: required("join_target_key")?,
                source_key: identity("source_key"),
                target_key: identity("target_key"),
                target,
            },
        };

        Ok(Self { relation, options })
    }

    pub fn kind(&self) -> RelationKind {
        self.relation.kind()
    }

    pub fn target(&self) -> &str {
        self.relation.target()
    }
}
