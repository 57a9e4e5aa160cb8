// QA Resource Hub - API Core
//
// Backend for community-submitted QA reference material (cheat sheets,
// templates, test cases, test scripts, boilerplates). Public submissions
// land in a per-type pending queue; admins review and publish them.
//
// Persistence is a single key-value namespace (see kernel::kv); the
// review state machine lives in domains::submissions.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
