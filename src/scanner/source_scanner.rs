//! Directory scan over Rust source files using syn

use std::path::{Path, PathBuf};

use anyhow::Result;
use syn::{Attribute, Expr, ExprLit, Fields, Item, ItemStruct, Lit, Meta, Visibility};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::facts::{DeclarationFact, FieldFact, ScanFailure, ScanResult};
use super::type_expr::resolve_type;
use crate::error::SchemaGenError;

/// Attribute carrying the flat attribute tag
pub const DB_ATTR: &str = "db";
/// Attribute carrying the relationship tag
pub const REL_ATTR: &str = "rel";
/// Attribute carrying the display/auxiliary tag
pub const DISPLAY_ATTR: &str = "display";

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &["tests", "target", "benches"];

/// How to walk the input directory
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Glob patterns, relative to the input directory, for files to skip
    pub exclude: Vec<String>,
}

/// Scan every non-test `.rs` file in `dir` and keep the entity declarations.
///
/// Unreadable or unparsable files, and individual declarations with malformed
/// tag attributes, are skipped with a warning; the rest of the scan continues.
pub fn scan_directory(dir: &Path, options: &ScanOptions) -> Result<ScanResult> {
    std::fs::read_dir(dir).map_err(|e| SchemaGenError::InputDirError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let exclude = options
        .exclude
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|e| SchemaGenError::InvalidExcludePattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = ScanResult::default();

    for path in find_source_files(dir, options.recursive) {
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        if exclude.iter().any(|p| p.matches_path(relative)) {
            debug!(path = %path.display(), "excluded by pattern");
            continue;
        }

        result.files_scanned += 1;
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                let err = SchemaGenError::SourceReadError {
                    path: path.clone(),
                    source: e,
                };
                warn!("Skipping file: {err}");
                result.skipped.push(ScanFailure {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let declarations = match scan_source(&content, &path) {
            Ok(declarations) => declarations,
            Err(err) => {
                warn!("Skipping file: {err}");
                result.skipped.push(ScanFailure {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };

        for declaration in declarations {
            match declaration {
                Ok(decl) if decl.is_entity() => result.declarations.push(decl),
                Ok(decl) => {
                    debug!(name = %decl.name, "helper type, not persisted");
                    result.helper_types.push(decl.name);
                }
                Err(failure) => {
                    warn!(
                        "Skipping declaration in {}: {}",
                        failure.path.display(),
                        failure.message
                    );
                    result.skipped.push(failure);
                }
            }
        }
    }

    debug!(
        files = result.files_scanned,
        entities = result.declarations.len(),
        helpers = result.helper_types.len(),
        "scan complete"
    );

    Ok(result)
}

fn find_source_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let walker = WalkDir::new(dir)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|p| p.extension().map_or(false, |ext| ext == "rs"))
        .filter(|p| !is_test_file(p))
        .collect()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

/// Test files by naming convention: `*_test.rs`, `*_tests.rs`, `tests.rs`.
pub fn is_test_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name == "tests.rs" || name.ends_with("_test.rs") || name.ends_with("_tests.rs")
}

/// Parse one source text into record declarations.
///
/// The outer error means the whole file is unusable. Each inner error is a
/// single declaration whose tag attributes are malformed.
pub fn scan_source(
    source: &str,
    path: &Path,
) -> Result<Vec<Result<DeclarationFact, ScanFailure>>, SchemaGenError> {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let file = syn::parse_file(source).map_err(|e| SchemaGenError::SourceParseError {
        path: path.to_path_buf(),
        line: e.span().start().line,
        message: e.to_string(),
    })?;

    let mut declarations = Vec::new();
    collect_items(&file.items, path, &mut declarations);
    Ok(declarations)
}

fn collect_items(
    items: &[Item],
    path: &Path,
    out: &mut Vec<Result<DeclarationFact, ScanFailure>>,
) {
    for item in items {
        match item {
            Item::Struct(item_struct) => {
                if let Some(decl) = extract_declaration(item_struct, path) {
                    out.push(decl);
                }
            }
            Item::Mod(module) if !is_cfg_test(&module.attrs) => {
                if let Some((_, nested)) = &module.content {
                    collect_items(nested, path, out);
                }
            }
            _ => {}
        }
    }
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .map_or(false, |ident| ident == "test")
    })
}

/// Record-shaped declarations only: structs with named fields.
fn extract_declaration(
    item: &ItemStruct,
    path: &Path,
) -> Option<Result<DeclarationFact, ScanFailure>> {
    let Fields::Named(named) = &item.fields else {
        return None;
    };
    let name = item.ident.to_string();
    let failure = |message: String| ScanFailure {
        path: path.to_path_buf(),
        message: format!("{}: {}", name, message),
    };

    let table_tag = match tag_value(&item.attrs, DB_ATTR) {
        Ok(tag) => tag,
        Err(message) => return Some(Err(failure(message))),
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };

        let tags = tag_value(&field.attrs, DB_ATTR).and_then(|db| {
            let rel = tag_value(&field.attrs, REL_ATTR)?;
            let display = tag_value(&field.attrs, DISPLAY_ATTR)?;
            Ok((db, rel, display))
        });
        let (db_tag, rel_tag, display_tag) = match tags {
            Ok(tags) => tags,
            Err(message) => return Some(Err(failure(format!("field {}: {}", ident, message)))),
        };

        let resolved = resolve_type(&field.ty);
        fields.push(FieldFact {
            name: ident.to_string(),
            type_name: resolved.base,
            is_pointer: resolved.is_pointer,
            is_collection: resolved.is_collection,
            db_tag,
            rel_tag,
            display_tag,
            line: ident.span().start().line,
        });
    }

    Some(Ok(DeclarationFact {
        name,
        source_file: path.to_path_buf(),
        line: item.ident.span().start().line,
        table_tag,
        fields,
    }))
}

/// Read `#[name = "..."]`. Repeated `db` attributes accumulate with `;`;
/// other repeated tags are rejected.
fn tag_value(attrs: &[Attribute], name: &str) -> Result<Option<String>, String> {
    let mut value: Option<String> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident(name)) {
        let text = match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => s.value(),
                _ => return Err(format!("`#[{}]` value must be a string literal", name)),
            },
            _ => return Err(format!("`#[{}]` must be written as #[{} = \"...\"]", name, name)),
        };

        value = match value {
            None => Some(text),
            Some(existing) if name == DB_ATTR => Some(format!("{};{}", existing, text)),
            Some(_) => return Err(format!("`#[{}]` given more than once", name)),
        };
    }

    Ok(value)
}
