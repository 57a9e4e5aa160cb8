// HTTP routes
pub mod admin;
pub mod health;
pub mod submissions;

pub use admin::*;
pub use health::*;
pub use submissions::*;
