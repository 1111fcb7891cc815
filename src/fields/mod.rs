// Field declarations and the registry that binds them to a dump

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod spec;

pub use descriptor::{BitAddress, FieldDescriptor};
pub use error::{FieldError, FieldResult};
pub use registry::{FieldRegistry, RegistryOptions};
pub use spec::{load_spec, save_spec, FieldSpec, SpecError};
