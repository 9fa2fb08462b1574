use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Install failed: {0}")]
    InstallFailed(String),
    #[error("Invalid partition name: {0}")]
    InvalidPartitionName(String),
    #[error("Cache location does not exist: {0}")]
    CacheLocationDoesNotExist(String),
    #[error("Cache location is not a directory: {0}")]
    CacheLocationIsNotADirectory(String),
    #[error("Corrupt cache entry: {0}")]
    CorruptCacheEntry(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Time conversion error: {0}")]
    TimeConversionError(String),
    #[error("HTTP transport error: {0}")]
    HttpTransportError(String),
}

pub trait AddContext<T, E>: Context<T, E> {
    fn err_context<C: Display + Send + Sync + 'static>(self, msg: C) -> Result<T, anyhow::Error>
    where
        Self: Sized,
    {
        self.with_context(|| msg.to_string())
    }
}

impl<U, T, E> AddContext<T, E> for U where U: Context<T, E> {}

pub fn gen<T: AsRef<str>>(msg: T) -> anyhow::Error {
    anyhow!(msg.as_ref().to_string())
}
