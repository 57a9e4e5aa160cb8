//! Shared test harness: in-memory store + mock identity provider wired
//! into the real service and router.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use hub_core::domains::submissions::SubmissionService;
use hub_core::kernel::test_dependencies::{MemoryKvStore, MockIdentityProvider};
use hub_core::kernel::ServerDeps;
use hub_core::server::build_app;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const ADMIN_EMAIL: &str = "admin@example.org";
pub const USER_TOKEN: &str = "user-token";
pub const ADMIN_SECRET: &str = "test-admin-secret";

pub struct TestHarness {
    pub store: Arc<MemoryKvStore>,
    pub identity: Arc<MockIdentityProvider>,
    pub service: Arc<SubmissionService>,
    pub app: Router,
}

impl TestHarness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryKvStore::new());
        let identity = Arc::new(
            MockIdentityProvider::new()
                .with_admin(ADMIN_TOKEN, ADMIN_EMAIL)
                .with_user(USER_TOKEN, "user@example.org"),
        );

        let deps = ServerDeps::new(
            store.clone(),
            identity.clone(),
            ADMIN_SECRET.to_string(),
        );
        let (app, service) = build_app(deps);

        Self {
            store,
            identity,
            service,
            app,
        }
    }
}
