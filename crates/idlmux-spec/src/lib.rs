pub mod loader;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod schema_def;
pub mod types;

pub use registry::{Registry, ResolveError, SymbolEntry, SymbolKind};
pub use types::common::Target;
pub use types::definitions::{
    EnumDef, EnumValue, Field, FieldType, Method, Schema, ServiceDef, TypeDef, TypeShape, UnionDef,
};
pub use types::error::{ErrorEntry, ValidationReport};
