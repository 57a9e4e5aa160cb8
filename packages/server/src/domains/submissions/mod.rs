// Submission domain: the submit -> review -> publish state machine.

pub mod errors;
pub mod models;
pub mod service;

pub use errors::*;
pub use models::*;
pub use service::*;
