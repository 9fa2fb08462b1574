#[cfg(test)]
pub mod utils {
    use crate::{
        api_defaults::{DEFAULT_CACHE_PREFIX, DEFAULT_CACHE_VERSION},
        cache::{CacheStorage, InMemoryCache, Partition},
        config::ConfigProperties,
        error::{self, ProxyError},
        http::Request,
        io::{Fetcher, Response},
        Result,
    };
    use std::sync::{Arc, Mutex};

    enum Scripted {
        Respond(Response),
        Fail(String),
    }

    /// Replays scripted outcomes. Like a stack, the last scripted outcome is
    /// the first one served.
    pub struct MockFetcher {
        script: Mutex<Vec<Scripted>>,
        urls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            MockFetcher {
                script: Mutex::new(Vec::new()),
                urls: Mutex::new(Vec::new()),
            }
        }

        pub fn respond(self, response: Response) -> Self {
            self.script.lock().unwrap().push(Scripted::Respond(response));
            self
        }

        pub fn fail(self, reason: &str) -> Self {
            self.script
                .lock()
                .unwrap()
                .push(Scripted::Fail(reason.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.urls.lock().unwrap().len()
        }

        pub fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl Fetcher for MockFetcher {
        fn fetch(&self, request: &Request) -> Result<Response> {
            self.urls.lock().unwrap().push(request.url().to_string());
            match self.script.lock().unwrap().pop() {
                Some(Scripted::Respond(response)) => Ok(response),
                Some(Scripted::Fail(reason)) => Err(error::gen(reason)),
                None => Err(error::gen(format!(
                    "no scripted response for {}",
                    request.url()
                ))),
            }
        }
    }

    pub struct ConfigMock {
        version: String,
        manifest: Vec<String>,
    }

    impl Default for ConfigMock {
        fn default() -> Self {
            ConfigMock {
                version: DEFAULT_CACHE_VERSION.to_string(),
                manifest: Vec::new(),
            }
        }
    }

    impl ConfigMock {
        pub fn with_version(self, version: &str) -> Self {
            ConfigMock {
                version: version.to_string(),
                ..self
            }
        }

        pub fn with_manifest(self, manifest: Vec<&str>) -> Self {
            ConfigMock {
                manifest: manifest.into_iter().map(|s| s.to_string()).collect(),
                ..self
            }
        }
    }

    impl ConfigProperties for ConfigMock {
        fn cache_location(&self) -> &str {
            ""
        }
        fn cache_prefix(&self) -> &str {
            DEFAULT_CACHE_PREFIX
        }
        fn version(&self) -> &str {
            &self.version
        }
        fn manifest(&self) -> Vec<String> {
            self.manifest.clone()
        }
    }

    struct BrokenPartition;

    impl Partition for BrokenPartition {
        fn get(&self, _key: &str) -> Result<Option<Response>> {
            Err(ProxyError::CorruptCacheEntry("truncated gzip stream".to_string()).into())
        }
        fn put(&self, _key: &str, _value: &Response) -> Result<()> {
            Err(error::gen("read-only partition"))
        }
        fn len(&self) -> Result<usize> {
            Ok(1)
        }
    }

    /// In-memory storage with two faulty partitions listed first: opening
    /// `loqui-broken-v1` fails and every read from `loqui-corrupt-v1` fails.
    /// Other partitions behave normally.
    pub struct FaultyCache {
        inner: InMemoryCache,
        fail_listing: bool,
    }

    impl FaultyCache {
        pub fn new() -> Self {
            let inner = InMemoryCache::default();
            inner.open("loqui-broken-v1").unwrap();
            inner.open("loqui-corrupt-v1").unwrap();
            FaultyCache {
                inner,
                fail_listing: false,
            }
        }

        pub fn fail_listing(self) -> Self {
            FaultyCache {
                fail_listing: true,
                ..self
            }
        }

        pub fn entry(&self, name: &str, key: &str) -> Option<Response> {
            self.inner.entry(name, key)
        }
    }

    impl CacheStorage for FaultyCache {
        fn open(&self, name: &str) -> Result<Arc<dyn Partition>> {
            match name {
                "loqui-broken-v1" => Err(error::gen("permission denied")),
                "loqui-corrupt-v1" => Ok(Arc::new(BrokenPartition)),
                _ => self.inner.open(name),
            }
        }

        fn delete(&self, name: &str) -> Result<bool> {
            self.inner.delete(name)
        }

        fn names(&self) -> Result<Vec<String>> {
            if self.fail_listing {
                return Err(error::gen("cache directory vanished"));
            }
            self.inner.names()
        }
    }
}
