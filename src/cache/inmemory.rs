use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    cache::{validate_partition_name, CacheStorage, Partition},
    error,
    io::Response,
};

use crate::Result;

/// Process local storage. Partitions keep their creation order. The read
/// and write counters cover every partition handed out by this storage, so
/// callers can verify whether a code path touched the cache at all.
#[derive(Default)]
pub struct InMemoryCache {
    partitions: Mutex<Vec<(String, Arc<InMemoryPartition>)>>,
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl InMemoryCache {
    pub fn reads(&self) -> usize {
        self.counters.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    /// Peek at an entry without going through the counters.
    pub fn entry(&self, name: &str, key: &str) -> Option<Response> {
        let partitions = self.partitions.lock().ok()?;
        let (_, partition) = partitions.iter().find(|(n, _)| n == name)?;
        let entries = partition.entries.lock().ok()?;
        entries.get(key).cloned()
    }
}

impl CacheStorage for InMemoryCache {
    fn open(&self, name: &str) -> Result<Arc<dyn Partition>> {
        validate_partition_name(name)?;
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| error::gen("in-memory cache - cannot lock partition registry"))?;
        if let Some((_, partition)) = partitions.iter().find(|(n, _)| n == name) {
            return Ok(partition.clone());
        }
        let partition = Arc::new(InMemoryPartition {
            entries: Mutex::new(HashMap::new()),
            counters: self.counters.clone(),
        });
        partitions.push((name.to_string(), partition.clone()));
        Ok(partition)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| error::gen("in-memory cache - cannot lock partition registry"))?;
        let before = partitions.len();
        partitions.retain(|(n, _)| n != name);
        Ok(partitions.len() != before)
    }

    fn names(&self) -> Result<Vec<String>> {
        let partitions = self
            .partitions
            .lock()
            .map_err(|_| error::gen("in-memory cache - cannot lock partition registry"))?;
        Ok(partitions.iter().map(|(n, _)| n.clone()).collect())
    }
}

pub struct InMemoryPartition {
    entries: Mutex<HashMap<String, Response>>,
    counters: Arc<Counters>,
}

impl Partition for InMemoryPartition {
    fn get(&self, key: &str) -> Result<Option<Response>> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        let entries = self
            .entries
            .lock()
            .map_err(|_| error::gen("in-memory cache - cannot lock partition"))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &Response) -> Result<()> {
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .map_err(|_| error::gen("in-memory cache - cannot lock partition"))?
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| error::gen("in-memory cache - cannot lock partition"))?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_open_is_lazy_and_idempotent() {
        let cache = InMemoryCache::default();
        assert!(cache.names().unwrap().is_empty());
        let partition = cache.open("loqui-dynamic-v1").unwrap();
        partition
            .put("GET https://loquievents.no/", &Response::synthetic(200, "home"))
            .unwrap();
        let reopened = cache.open("loqui-dynamic-v1").unwrap();
        assert_eq!(1, reopened.len().unwrap());
        assert_eq!(vec!["loqui-dynamic-v1".to_string()], cache.names().unwrap());
    }

    #[test]
    fn test_delete_drops_entries() {
        let cache = InMemoryCache::default();
        cache
            .open("loqui-static-v0")
            .unwrap()
            .put("GET https://loquievents.no/", &Response::synthetic(200, "old"))
            .unwrap();
        assert!(cache.delete("loqui-static-v0").unwrap());
        assert!(!cache.delete("loqui-static-v0").unwrap());
        assert!(cache.names().unwrap().is_empty());
        let partition = cache.open("loqui-static-v0").unwrap();
        assert_eq!(0, partition.len().unwrap());
    }

    #[test]
    fn test_counters_track_partition_access() {
        let cache = InMemoryCache::default();
        let partition = cache.open("loqui-dynamic-v1").unwrap();
        partition
            .put("GET https://loquievents.no/", &Response::synthetic(200, "home"))
            .unwrap();
        partition.get("GET https://loquievents.no/").unwrap();
        partition.get("GET https://loquievents.no/missing").unwrap();
        assert_eq!(2, cache.reads());
        assert_eq!(1, cache.writes());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = InMemoryCache::default();
        let partition = cache.open("loqui-dynamic-v1").unwrap();
        let key = "GET https://loquievents.no/";
        partition.put(key, &Response::synthetic(200, "first")).unwrap();
        partition.put(key, &Response::synthetic(200, "second")).unwrap();
        assert_eq!("second", cache.entry("loqui-dynamic-v1", key).unwrap().text());
    }

    #[test]
    fn test_invalid_partition_name_is_error() {
        let cache = InMemoryCache::default();
        assert!(cache.open("../static").is_err());
    }
}
