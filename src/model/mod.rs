//! Schema model, table registry, type normalization, and linking

mod builder;
mod elements;
mod linker;
mod registry;
mod type_normalizer;

pub use builder::build_model;
pub use elements::*;
pub use linker::{assemble_model, link_relationships};
pub use registry::{table_key, IdGenerator, SequentialIdGenerator, TableRegistry, UuidIdGenerator};
pub use type_normalizer::normalize_type;
