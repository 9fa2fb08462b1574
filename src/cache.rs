use std::sync::Arc;

use regex::Regex;

use crate::error::ProxyError;
use crate::io::Response;

pub mod filesystem;
pub mod inmemory;
pub mod nocache;

use crate::Result;
pub use inmemory::InMemoryCache;
pub use nocache::NoCache;

/// A named, isolated bucket of request key to response pairs.
pub trait Partition: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Response>>;
    /// Stores `value` under `key`, replacing any previous entry.
    fn put(&self, key: &str, value: &Response) -> Result<()>;
    fn len(&self) -> Result<usize>;
}

/// Registry of named partitions. Partitions are created on first `open` and
/// live until they are deleted.
pub trait CacheStorage: Send + Sync {
    fn open(&self, name: &str) -> Result<Arc<dyn Partition>>;
    /// Returns whether a partition with that name existed.
    fn delete(&self, name: &str) -> Result<bool>;
    fn names(&self) -> Result<Vec<String>>;

    /// Searches every partition in listing order and returns the first
    /// entry stored under `key`. A partition that cannot be listed, opened
    /// or read counts as a miss, so callers fall through to the network and
    /// overwrite the unreadable entry.
    fn lookup(&self, key: &str) -> Result<Option<Response>> {
        let names = match self.names() {
            Ok(names) => names,
            Err(err) => {
                warn!("Cannot list cache partitions, treating {key} as a miss: {err:#}");
                return Ok(None);
            }
        };
        for name in names {
            let partition = match self.open(&name) {
                Ok(partition) => partition,
                Err(err) => {
                    warn!("Cannot open cache partition {name}, skipping: {err:#}");
                    continue;
                }
            };
            match partition.get(key) {
                Ok(Some(response)) => {
                    debug!("Cache hit in {name} for {key}");
                    return Ok(Some(response));
                }
                Ok(None) => {}
                Err(err) => warn!("Cannot read {key} from cache partition {name}: {err:#}"),
            }
        }
        Ok(None)
    }
}

/// Partition names end up as directory names on disk.
pub fn validate_partition_name(name: &str) -> Result<()> {
    lazy_static! {
        static ref RE_PARTITION_NAME: Regex =
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
    }
    if name.len() > 128 || !RE_PARTITION_NAME.is_match(name) {
        return Err(ProxyError::InvalidPartitionName(name.to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::utils::FaultyCache;

    #[test]
    fn test_validate_partition_names() {
        let test_table = vec![
            ("loqui-static-v1", true),
            ("loqui-dynamic-v2", true),
            ("loqui.events_v1", true),
            ("", false),
            ("../etc", false),
            (".hidden", false),
            ("with space", false),
            ("a/b", false),
        ];
        for (name, valid) in test_table {
            assert_eq!(valid, validate_partition_name(name).is_ok(), "name: {name}");
        }
    }

    #[test]
    fn test_lookup_returns_first_match_in_listing_order() {
        let cache = InMemoryCache::default();
        let first = Response::synthetic(200, "static copy");
        let second = Response::synthetic(200, "dynamic copy");
        let key = "GET https://loquievents.no/";
        cache.open("loqui-static-v1").unwrap().put(key, &first).unwrap();
        cache.open("loqui-dynamic-v1").unwrap().put(key, &second).unwrap();
        let found = cache.lookup(key).unwrap().unwrap();
        assert_eq!("static copy", found.text());
    }

    #[test]
    fn test_lookup_skips_partitions_that_fail() {
        let storage = FaultyCache::new();
        let key = "GET https://loquievents.no/";
        assert!(storage.lookup(key).unwrap().is_none());
        storage
            .open("loqui-dynamic-v1")
            .unwrap()
            .put(key, &Response::synthetic(200, "cached"))
            .unwrap();
        assert_eq!("cached", storage.lookup(key).unwrap().unwrap().text());
    }

    #[test]
    fn test_lookup_listing_failure_is_a_miss() {
        let storage = FaultyCache::new().fail_listing();
        assert!(storage.lookup("GET https://loquievents.no/").unwrap().is_none());
    }

    #[test]
    fn test_lookup_miss() {
        let cache = InMemoryCache::default();
        cache.open("loqui-static-v1").unwrap();
        assert!(cache.lookup("GET https://loquievents.no/").unwrap().is_none());
    }
}
