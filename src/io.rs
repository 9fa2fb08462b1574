use std::borrow::Cow;

use crate::{
    http::{Headers, Request},
    Result,
};

/// A trait for anything that can take a `Request` to the network and bring
/// back a `Response`. An `Err` means the request never produced an HTTP
/// response (offline, DNS, timeout, refused connection). HTTP error statuses
/// are successful fetches and come back as `Ok` with the status set.
/// Implementors can do real HTTP calls or replay scripted responses for
/// testing purposes.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Response as seen by the page: status, lowercased headers and the raw
/// body. The same type is stored in cache partitions.
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct Response {
    pub status: u16,
    #[builder(default)]
    pub headers: Headers,
    #[builder(setter(into), default)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// Locally built placeholder used when neither cache nor network can
    /// answer.
    pub fn synthetic(status: u16, body: &str) -> Self {
        Response {
            status,
            headers: Headers::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    /// Only 2xx responses qualify for caching.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|s| s.as_str())
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
