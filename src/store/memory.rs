//! In-memory user store for tests and lightweight embeddings.

use super::{UserRecord, UserStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A [`UserStore`] holding records in process memory.
///
/// Lookups return cloned snapshots, so callers observe the same isolation the
/// Postgres backend gives them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, keyed by name.
    pub async fn insert(&self, record: UserRecord) {
        self.users
            .write()
            .await
            .insert(record.name().to_string(), record);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(name).cloned())
    }

    async fn record_failed_login(&self, name: &str) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(name) {
            user.bump_login_attempts();
        }
        Ok(())
    }

    async fn reset_login_attempts(&self, name: &str) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(name) {
            user.clear_login_attempts();
        }
        Ok(())
    }
}
