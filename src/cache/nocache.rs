use std::sync::Arc;

use crate::cache::{CacheStorage, Partition};
use crate::io::Response;

use crate::Result;

/// Storage that remembers nothing. Every lookup misses and every write is
/// dropped, so the proxy degrades to plain network access.
pub struct NoCache;

struct NoPartition;

impl CacheStorage for NoCache {
    fn open(&self, _name: &str) -> Result<Arc<dyn Partition>> {
        Ok(Arc::new(NoPartition))
    }
    fn delete(&self, _name: &str) -> Result<bool> {
        Ok(false)
    }
    fn names(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

impl Partition for NoPartition {
    fn get(&self, _key: &str) -> Result<Option<Response>> {
        Ok(None)
    }
    fn put(&self, _key: &str, _value: &Response) -> Result<()> {
        Ok(())
    }
    fn len(&self) -> Result<usize> {
        Ok(0)
    }
}
