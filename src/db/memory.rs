use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::model::*;
use super::repo::*;

/// Volatile storage. The failure switches let callers exercise degraded
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    items: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let repo = Self::default();
        repo.lock().insert(key.to_string(), value.to_string());
        repo
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct peek, bypassing the failure switches.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueRepo for MemoryRepository {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("quota exceeded".to_string()));
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
