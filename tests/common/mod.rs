//! Common test utilities for schemagen tests

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use schemagen::{GenerateOptions, GenerationSummary};

/// Fixed timestamp so generated output is reproducible
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Stored for debugging purposes
    fixture_name: String,
}

impl TestContext {
    /// Create a new test context by copying a fixture to a temp directory
    pub fn with_fixture(fixture_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(fixture_name);

        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("generated");

        copy_dir_recursive(&fixture_path, &input_dir).expect("Failed to copy fixture");

        Self {
            _temp_dir: temp_dir,
            input_dir,
            output_dir,
            fixture_name: fixture_name.to_string(),
        }
    }

    /// Options for this context with a fixed timestamp
    pub fn options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new(&self.input_dir, &self.output_dir);
        options.generated_at = Some(fixed_timestamp());
        options
    }

    pub fn generate(&self) -> anyhow::Result<GenerationSummary> {
        schemagen::generate(&self.options())
    }

    /// Generate and panic if generation fails
    pub fn generate_successfully(&self) -> GenerationSummary {
        match self.generate() {
            Ok(summary) => summary,
            Err(e) => panic!("Generation failed for fixture '{}': {:#}", self.fixture_name, e),
        }
    }

    /// Read a generated file by name
    pub fn read_output(&self, file_name: &str) -> String {
        fs::read_to_string(self.output_dir.join(file_name))
            .unwrap_or_else(|e| panic!("Failed to read generated {}: {}", file_name, e))
    }

    /// Sorted names of the files in the output directory
    pub fn output_files(&self) -> Vec<String> {
        list_files(&self.output_dir)
    }
}

/// Sorted file names directly inside `dir`; empty when it does not exist
pub fn list_files(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Recursively copy a directory
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}
