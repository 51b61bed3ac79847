pub mod context;
pub mod error;
pub mod generator;
pub mod traits;

// Target emitters
pub mod emitters;

// Re-exports
pub use context::{EmitContext, MapTypeArena};
pub use error::CodegenError;
pub use generator::{CodeGenerator, GeneratedOutput};
pub use traits::{Emission, SchemaEmitter};
