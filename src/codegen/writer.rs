//! Writing artifacts to disk and cleaning them up again

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use super::GENERATED_MARKER;
use crate::error::SchemaGenError;

/// Sink for rendered artifact text
pub trait FileWriter {
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes straight to the filesystem, creating parent directories
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl FileWriter for FsWriter {
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)
    }
}

/// True if the file's first line is the generated-code marker.
pub fn is_generated_file(path: &Path) -> io::Result<bool> {
    let mut first_line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut first_line)?;
    Ok(first_line.trim_end() == GENERATED_MARKER)
}

/// Delete the generated `.rs` files directly inside `dir`. Files without the
/// marker are left alone. A missing directory has nothing to clean.
pub fn clean_generated(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| SchemaGenError::CleanError {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().map_or(false, |ext| ext == "rs"))
        .collect();
    candidates.sort();

    let mut removed = Vec::new();
    for path in candidates {
        let generated = is_generated_file(&path).map_err(|e| SchemaGenError::CleanError {
            path: path.clone(),
            source: e,
        })?;
        if !generated {
            debug!(path = %path.display(), "keeping hand-written file");
            continue;
        }
        std::fs::remove_file(&path).map_err(|e| SchemaGenError::CleanError {
            path: path.clone(),
            source: e,
        })?;
        removed.push(path);
    }

    Ok(removed)
}
