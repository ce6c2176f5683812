//! The in-process store as a backend

use super::{BackendError, KvBackend};
use crate::store::{KeyHasher, Store};
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
impl<H: KeyHasher + 'static> KvBackend for Store<H> {
    fn name(&self) -> &'static str {
        "local"
    }

    // Store operations only hold a lock for a map insert or a Vec push,
    // so they run inline on the worker.
    async fn set(&self, key: &str, value: Bytes) -> Result<(), BackendError> {
        self.put(key, value)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, BackendError> {
        Ok(Store::get(self, key)?)
    }
}
