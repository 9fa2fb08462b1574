use crate::error::ProxyError;
use crate::io::{Fetcher, Response};
use crate::time::Seconds;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map, HashMap};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use ureq::Agent;
use url::Url;

/// Blocking network client. HTTP error statuses are returned as regular
/// responses; only transport failures are errors.
pub struct Client {
    agent: Agent,
}

impl Client {
    pub fn new(timeout: Seconds) -> Self {
        let timeout = if *timeout == 0 {
            None
        } else {
            Some(timeout.into())
        };
        let config = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build();
        Client {
            agent: config.into(),
        }
    }

    fn call(
        &self,
        request: &Request,
    ) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let url = request.url().as_str();
        let headers = request.headers();
        let body = request.body().unwrap_or_default();
        match request.method() {
            Method::GET => with_headers(self.agent.get(url), headers).call(),
            Method::HEAD => with_headers(self.agent.head(url), headers).call(),
            Method::DELETE => with_headers(self.agent.delete(url), headers).call(),
            Method::POST => with_headers(self.agent.post(url), headers).send(body),
            Method::PUT => with_headers(self.agent.put(url), headers).send(body),
            Method::PATCH => with_headers(self.agent.patch(url), headers).send(body),
        }
    }
}

fn with_headers<B>(
    builder: ureq::RequestBuilder<B>,
    headers: &Headers,
) -> ureq::RequestBuilder<B> {
    headers.iter().fold(builder, |req, (key, value)| {
        req.header(key.as_str(), value.as_str())
    })
}

impl Fetcher for Client {
    fn fetch(&self, request: &Request) -> Result<Response> {
        debug!("{} {}", request.method(), request.url());
        let mut response = self
            .call(request)
            .map_err(|err| ProxyError::HttpTransportError(format!("{}: {err}", request.url())))?;
        let status = response.status().as_u16();
        // Grab headers so they travel with the cached copy.
        let headers = response
            .headers()
            .iter()
            .fold(Headers::new(), |mut headers, (name, value)| {
                if let Ok(value) = value.to_str() {
                    headers.set(name.as_str(), value);
                }
                headers
            });
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|err| ProxyError::HttpTransportError(format!("{}: {err}", request.url())))?;
        let response = Response::builder()
            .status(status)
            .headers(headers)
            .body(body)
            .build()?;
        Ok(response)
    }
}

/// Header names are stored lowercased.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(HashMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Headers(HashMap::new())
    }

    pub fn set<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.as_ref().to_lowercase(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(&key.to_lowercase())
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let method = match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        };
        write!(f, "{method}")
    }
}

impl FromStr for Method {
    type Err = ProxyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            _ => Err(ProxyError::InvalidRequest(format!(
                "Unsupported HTTP method: {s}"
            ))),
        }
    }
}

/// The kind of resource the page declared it is loading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Destination {
    #[default]
    Empty,
    Document,
    Image,
    Font,
    Script,
    Style,
}

impl FromStr for Destination {
    type Err = ProxyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "empty" => Ok(Destination::Empty),
            "document" => Ok(Destination::Document),
            "image" => Ok(Destination::Image),
            "font" => Ok(Destination::Font),
            "script" => Ok(Destination::Script),
            "style" => Ok(Destination::Style),
            _ => Err(ProxyError::InvalidRequest(format!(
                "Unknown request destination: {s}"
            ))),
        }
    }
}

#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned")]
pub struct Request {
    #[builder(default)]
    method: Method,
    url: Url,
    #[builder(default)]
    destination: Destination,
    #[builder(default)]
    headers: Headers,
    #[builder(setter(into, strip_option), default)]
    body: Option<Vec<u8>>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn new(url: &str, method: Method) -> Result<Self> {
        let url =
            Url::parse(url).map_err(|err| ProxyError::InvalidUrl(format!("{url}: {err}")))?;
        Ok(Request::from_url(url, method))
    }

    pub fn from_url(url: Url, method: Method) -> Self {
        Request {
            method,
            url,
            destination: Destination::Empty,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.set(key, value);
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Request identity used as the key of cached entries.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}
