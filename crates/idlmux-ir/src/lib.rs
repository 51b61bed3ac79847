pub mod capability;
pub mod graph;
pub mod maps;
pub mod names;
pub mod namespace;
pub mod naming;
pub mod numbering;
pub mod scope;
pub mod usage;

pub use capability::{FieldNumbering, MapSynthesis, UnionRendering};
pub use names::NameTable;
pub use numbering::{NumberedField, NumberingCollision};
pub use scope::{Qualification, RenderScope};
pub use usage::{Usage, UsageMap};
