//! Wiring shared by the commands that run requests through the proxy.
use std::fs;
use std::sync::Arc;

use url::Url;

use crate::cache::filesystem::FileCache;
use crate::cache::{CacheStorage, NoCache};
use crate::config::{Config, ConfigProperties};
use crate::error::{AddContext, ProxyError};
use crate::http::Client;
use crate::proxy::OfflineProxy;
use crate::refresh::Spawner;
use crate::Result;

pub fn storage(config: Arc<Config>, no_cache: bool) -> Result<Arc<dyn CacheStorage>> {
    if no_cache {
        debug!("Cache disabled, every request goes to the network");
        return Ok(Arc::new(NoCache));
    }
    if config.cache_location().is_empty() {
        return Err(ProxyError::ConfigurationError(
            "No cache_location configured. Set <host>.cache_location in the config \
             file or run with --no-cache"
                .to_string(),
        )
        .into());
    }
    fs::create_dir_all(config.cache_location()).err_context(format!(
        "Cannot create cache directory {}",
        config.cache_location()
    ))?;
    let file_cache = FileCache::new(config);
    file_cache.validate_cache_location()?;
    Ok(Arc::new(file_cache))
}

pub fn proxy(
    origin: Url,
    config: Arc<Config>,
    no_cache: bool,
    spawner: Arc<dyn Spawner>,
) -> Result<OfflineProxy> {
    let storage = storage(config.clone(), no_cache)?;
    let fetcher = Arc::new(Client::new(config.fetch_timeout()));
    Ok(OfflineProxy::new(
        origin,
        config.as_ref(),
        storage,
        fetcher,
        spawner,
    ))
}
