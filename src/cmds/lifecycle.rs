use std::io::Write;

use crate::proxy::Lifecycle;
use crate::Result;

/// Caches the install manifest and activates the new version right away,
/// the same way a freshly installed worker skips waiting.
pub fn install<W: Write>(proxy: &dyn Lifecycle, writer: &mut W) -> Result<()> {
    let cached = proxy.on_install()?;
    writeln!(writer, "Cached {cached} static assets")?;
    activate(proxy, writer)
}

pub fn activate<W: Write>(proxy: &dyn Lifecycle, writer: &mut W) -> Result<()> {
    let deleted = proxy.on_activate()?;
    if deleted.is_empty() {
        writeln!(writer, "No stale cache partitions")?;
    }
    for name in deleted {
        writeln!(writer, "Deleted stale cache partition {name}")?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::Arc;

    use url::Url;

    use crate::cache::{CacheStorage, InMemoryCache};
    use crate::io::Response;
    use crate::proxy::OfflineProxy;
    use crate::refresh::ThreadSpawner;
    use crate::test::utils::{ConfigMock, MockFetcher};

    fn proxy(fetcher: MockFetcher, cache: Arc<InMemoryCache>) -> OfflineProxy {
        let config = ConfigMock::default()
            .with_version("v2")
            .with_manifest(vec!["/", "/index.html"]);
        OfflineProxy::new(
            Url::parse("https://loquievents.no").unwrap(),
            &config,
            cache,
            Arc::new(fetcher),
            Arc::new(ThreadSpawner::default()),
        )
    }

    #[test]
    fn test_install_then_activate() {
        let cache = Arc::new(InMemoryCache::default());
        cache.open("loqui-static-v1").unwrap();
        let fetcher = MockFetcher::new()
            .respond(Response::synthetic(200, "index"))
            .respond(Response::synthetic(200, "root"));
        let proxy = proxy(fetcher, cache.clone());
        let mut writer = Vec::new();
        install(&proxy, &mut writer).unwrap();
        assert_eq!(
            "Cached 2 static assets\nDeleted stale cache partition loqui-static-v1\n",
            String::from_utf8(writer).unwrap()
        );
        assert_eq!(vec!["loqui-static-v2"], cache.names().unwrap());
    }

    #[test]
    fn test_failed_install_does_not_activate() {
        let cache = Arc::new(InMemoryCache::default());
        cache.open("loqui-static-v1").unwrap();
        let fetcher = MockFetcher::new()
            .fail("network unreachable")
            .respond(Response::synthetic(200, "root"));
        let proxy = proxy(fetcher, cache.clone());
        let mut writer = Vec::new();
        assert!(install(&proxy, &mut writer).is_err());
        assert!(writer.is_empty());
        assert_eq!(vec!["loqui-static-v1"], cache.names().unwrap());
    }

    #[test]
    fn test_activate_without_stale_partitions() {
        let proxy = proxy(MockFetcher::new(), Arc::new(InMemoryCache::default()));
        let mut writer = Vec::new();
        activate(&proxy, &mut writer).unwrap();
        assert_eq!("No stale cache partitions\n", String::from_utf8(writer).unwrap());
    }
}
