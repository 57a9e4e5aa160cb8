// Mock implementations for testing
//
// Provides in-memory stand-ins for the store and the identity provider
// so service and router tests run without Postgres or a live auth
// service.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::Value;

use super::{Identity, IdentityError, IdentityProvider, KvStore, StoreError};

// =============================================================================
// In-memory key-value store
// =============================================================================

/// HashMap-backed `KvStore`.
///
/// `fail_next_write` makes the next `set` return a database error, for
/// exercising failure paths without a real backend.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Value>>,
    fail_next_write: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `set` call fail with a store error
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.lock().unwrap().remove(key).is_some())
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}

// =============================================================================
// Mock identity provider
// =============================================================================

/// Token-table identity provider.
///
/// Unknown tokens resolve to `InvalidToken`; `create_admin_user` records
/// the call and hands back an admin identity.
#[derive(Default)]
pub struct MockIdentityProvider {
    tokens: Mutex<HashMap<String, Identity>>,
    created: Mutex<Vec<String>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token resolving to an admin identity
    pub fn with_admin(self, token: &str, email: &str) -> Self {
        self.insert(token, email, true);
        self
    }

    /// Register a token resolving to a regular (non-admin) identity
    pub fn with_user(self, token: &str, email: &str) -> Self {
        self.insert(token, email, false);
        self
    }

    fn insert(&self, token: &str, email: &str, is_admin: bool) {
        self.tokens.lock().unwrap().insert(
            token.to_string(),
            Identity {
                id: format!("user_{}", email),
                email: email.to_string(),
                name: None,
                is_admin,
            },
        );
    }

    /// Emails passed to `create_admin_user` so far
    pub fn created_emails(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, IdentityError> {
        self.tokens
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }

    async fn create_admin_user(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<Identity, IdentityError> {
        self.created.lock().unwrap().push(email.to_string());
        Ok(Identity {
            id: format!("user_{}", email),
            email: email.to_string(),
            name: Some(name.to_string()),
            is_admin: true,
        })
    }
}
