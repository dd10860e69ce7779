use async_trait::async_trait;

use super::model::*;

/// String-keyed durable storage, the server-side counterpart of a browser's
/// local storage.
#[async_trait]
pub trait KeyValueRepo: Send + Sync {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;
}
