pub mod codec;
pub mod entities;
pub mod ports;
pub mod value_objects;

pub use codec::*;
pub use entities::*;
pub use ports::*;
pub use registry_errors::{RegistryError, RegistryResult};
pub use value_objects::*;
