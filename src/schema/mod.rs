pub mod registry;
pub mod types;

pub use registry::{ModelHandle, ResolvedModel, SchemaRegistry};
pub use types::{FieldInfo, FieldSpec, FieldType};
