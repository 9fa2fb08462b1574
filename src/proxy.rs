//! Request-handling policy of the offline cache proxy.
//!
//! Every intercepted GET is classified as an image, a same-origin or a
//! cross-origin request and answered with cache-first,
//! stale-while-revalidate or network-first respectively. A handled request
//! always gets a well-formed response: when neither cache nor network can
//! answer, a synthetic one is built locally.

use std::sync::Arc;

use url::Url;

use crate::api_defaults::{DYNAMIC_PARTITION, ERROR_BODY, OFFLINE_BODY, STATIC_PARTITION};
use crate::cache::CacheStorage;
use crate::config::ConfigProperties;
use crate::error::{self, ProxyError};
use crate::http::{Destination, Method, Request};
use crate::io::{Fetcher, Response};
use crate::refresh::Spawner;
use crate::Result;

/// The three phases a host drives.
pub trait Lifecycle {
    /// Populates the static partition with the install manifest. Nothing is
    /// written unless every manifest entry was fetched successfully.
    fn on_install(&self) -> Result<usize>;
    /// Deletes every partition that does not belong to the current version.
    /// Returns the deleted names.
    fn on_activate(&self) -> Result<Vec<String>>;
    fn handle(&self, request: &Request) -> Handled;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Handled {
    Respond(Response),
    /// Not intercepted. The host forwards the request as if the proxy was
    /// not there.
    Passthrough,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestClass {
    Image,
    SameOrigin,
    CrossOrigin,
}

pub fn classify(request: &Request, origin: &Url) -> RequestClass {
    if request.destination() == Destination::Image {
        RequestClass::Image
    } else if request.url().origin() == origin.origin() {
        RequestClass::SameOrigin
    } else {
        RequestClass::CrossOrigin
    }
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Versioned partition names. Only `static_name` and `dynamic_name` are
/// live; anything else found in storage is stale.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionNames {
    pub static_name: String,
    pub dynamic_name: String,
}

impl PartitionNames {
    pub fn new(prefix: &str, version: &str) -> Self {
        PartitionNames {
            static_name: format!("{prefix}-{STATIC_PARTITION}-{version}"),
            dynamic_name: format!("{prefix}-{DYNAMIC_PARTITION}-{version}"),
        }
    }

    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.dynamic_name
    }
}

pub struct OfflineProxy {
    origin: Url,
    names: PartitionNames,
    manifest: Vec<String>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    spawner: Arc<dyn Spawner>,
}

impl OfflineProxy {
    pub fn new(
        origin: Url,
        config: &dyn ConfigProperties,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        spawner: Arc<dyn Spawner>,
    ) -> Self {
        OfflineProxy {
            origin,
            names: PartitionNames::new(config.cache_prefix(), config.version()),
            manifest: config.manifest(),
            storage,
            fetcher,
            spawner,
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Handles the request and forwards it to the network when it is not
    /// intercepted.
    pub fn respond(&self, request: &Request) -> Result<Response> {
        match self.handle(request) {
            Handled::Respond(response) => Ok(response),
            Handled::Passthrough => self.fetcher.fetch(request),
        }
    }

    fn cache_first(&self, request: &Request) -> Result<Response> {
        let key = request.cache_key();
        if let Some(cached) = self.storage.lookup(&key)? {
            debug!("cache-first: serving {key} from cache");
            return Ok(cached);
        }
        let response = self.fetcher.fetch(request)?;
        put_dynamic(self.storage.as_ref(), &self.names.dynamic_name, &key, &response);
        Ok(response)
    }

    fn stale_while_revalidate(&self, request: &Request) -> Response {
        let key = request.cache_key();
        let cached = match self.storage.lookup(&key) {
            Ok(cached) => cached,
            Err(err) => {
                error!("stale-while-revalidate: cache lookup for {key} failed: {err:#}");
                return Response::synthetic(500, ERROR_BODY);
            }
        };
        if let Some(cached) = cached {
            debug!("stale-while-revalidate: serving {key} from cache, refreshing");
            self.schedule_refresh(request.clone(), key);
            return cached;
        }
        match self.fetcher.fetch(request) {
            Ok(response) => {
                put_dynamic(self.storage.as_ref(), &self.names.dynamic_name, &key, &response);
                response
            }
            Err(err) => {
                warn!("stale-while-revalidate: {key} not cached and network failed: {err:#}");
                Response::synthetic(503, OFFLINE_BODY)
            }
        }
    }

    fn schedule_refresh(&self, request: Request, key: String) {
        let storage = self.storage.clone();
        let fetcher = self.fetcher.clone();
        let dynamic_name = self.names.dynamic_name.clone();
        self.spawner.spawn(
            format!("refresh {key}"),
            Box::new(move || {
                let response = fetcher.fetch(&request)?;
                if !response.is_ok() {
                    return Err(error::gen(format!(
                        "refresh returned status {}, keeping cached copy",
                        response.status
                    )));
                }
                storage.open(&dynamic_name)?.put(&key, &response)
            }),
        );
    }

    fn network_first(&self, request: &Request) -> Response {
        let key = request.cache_key();
        match self.fetcher.fetch(request) {
            Ok(response) => {
                put_dynamic(self.storage.as_ref(), &self.names.dynamic_name, &key, &response);
                response
            }
            Err(err) => {
                warn!("network-first: network failed for {key}, trying cache: {err:#}");
                match self.storage.lookup(&key) {
                    Ok(Some(cached)) => cached,
                    Ok(None) => Response::synthetic(503, OFFLINE_BODY),
                    Err(err) => {
                        error!("network-first: cache lookup for {key} failed: {err:#}");
                        Response::synthetic(503, OFFLINE_BODY)
                    }
                }
            }
        }
    }
}

/// Stores successful responses in the dynamic partition. Storage failures
/// only get logged: the caller already has its response.
fn put_dynamic(storage: &dyn CacheStorage, dynamic_name: &str, key: &str, response: &Response) {
    if !response.is_ok() {
        debug!("Not caching {key}: status {}", response.status);
        return;
    }
    if let Err(err) = storage
        .open(dynamic_name)
        .and_then(|partition| partition.put(key, response))
    {
        warn!("Cannot cache {key} in {dynamic_name}: {err:#}");
    }
}

impl Lifecycle for OfflineProxy {
    fn on_install(&self) -> Result<usize> {
        info!("Installing: caching {} static assets", self.manifest.len());
        let mut fetched = Vec::with_capacity(self.manifest.len());
        for entry in &self.manifest {
            let url = self.origin.join(entry).map_err(|err| {
                ProxyError::InstallFailed(format!("invalid manifest entry {entry}: {err}"))
            })?;
            let request = Request::from_url(url, Method::GET);
            let response = self.fetcher.fetch(&request).map_err(|err| {
                ProxyError::InstallFailed(format!("{}: {err:#}", request.url()))
            })?;
            if !response.is_ok() {
                return Err(ProxyError::InstallFailed(format!(
                    "{} returned status {}",
                    request.url(),
                    response.status
                ))
                .into());
            }
            fetched.push((request.cache_key(), response));
        }
        let partition = self.storage.open(&self.names.static_name)?;
        for (key, response) in &fetched {
            partition.put(key, response)?;
        }
        info!("Installed: {} assets in {}", fetched.len(), self.names.static_name);
        Ok(fetched.len())
    }

    fn on_activate(&self) -> Result<Vec<String>> {
        info!("Activating {} and {}", self.names.static_name, self.names.dynamic_name);
        let mut deleted = Vec::new();
        for name in self.storage.names()? {
            if self.names.is_current(&name) {
                continue;
            }
            info!("Deleting old cache partition {name}");
            if self.storage.delete(&name)? {
                deleted.push(name);
            }
        }
        info!("Activated, claiming open clients");
        Ok(deleted)
    }

    fn handle(&self, request: &Request) -> Handled {
        if request.method() != Method::GET {
            return Handled::Passthrough;
        }
        let class = classify(request, &self.origin);
        // Non web schemes cannot be fetched nor cached.
        if class != RequestClass::SameOrigin && !is_web_scheme(request.url()) {
            debug!("Not intercepting {}: unsupported scheme", request.url());
            return Handled::Passthrough;
        }
        let response = match class {
            RequestClass::Image => self.cache_first(request).unwrap_or_else(|err| {
                warn!("cache-first: cannot serve {}: {err:#}", request.url());
                Response::synthetic(404, "")
            }),
            RequestClass::SameOrigin => self.stale_while_revalidate(request),
            RequestClass::CrossOrigin => self.network_first(request),
        };
        Handled::Respond(response)
    }
}
