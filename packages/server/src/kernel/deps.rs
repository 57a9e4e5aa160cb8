//! Server dependencies (using traits for testability)
//!
//! Central dependency container constructed once in `main` and injected
//! into the submission service. All external services sit behind trait
//! objects so tests can swap in the mocks from `test_dependencies`.

use std::sync::Arc;

use super::{IdentityProvider, KvStore};

/// Server dependencies accessible to the domain layer
#[derive(Clone)]
pub struct ServerDeps {
    /// Sole persistence primitive (submissions + indices)
    pub store: Arc<dyn KvStore>,
    /// External authentication/provisioning service
    pub identity: Arc<dyn IdentityProvider>,
    /// Shared secret gating admin signup
    pub admin_secret: String,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn KvStore>,
        identity: Arc<dyn IdentityProvider>,
        admin_secret: String,
    ) -> Self {
        Self {
            store,
            identity,
            admin_secret,
        }
    }
}
