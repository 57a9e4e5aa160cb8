// Infrastructure layer: traits for external dependencies plus their
// production implementations. Business logic lives in domains/*.

pub mod deps;
pub mod identity;
pub mod kv;
pub mod test_dependencies;

pub use deps::*;
pub use identity::*;
pub use kv::*;
