//! Code generation from a validated model

mod dispatcher;
mod payload;
mod renderer;
mod templates;
mod writer;

pub use dispatcher::{render_artifacts, write_artifacts, Artifact, ArtifactKind, RenderContext};
pub use payload::TemplatePayload;
pub use renderer::{RenderError, TemplateId, TemplateRenderer};
pub use templates::RustTemplates;
pub use writer::{clean_generated, is_generated_file, FileWriter, FsWriter};

/// First line of every generated file. `clean` only removes files that
/// start with it.
pub const GENERATED_MARKER: &str = "// Code generated by schemagen. DO NOT EDIT.";
