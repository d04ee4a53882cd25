//! Entity metadata model building

mod builder;
mod elements;
mod registry;

pub use builder::{build_entity, build_model, infer_sql_type};
pub use elements::*;
pub use registry::ModelRegistry;
