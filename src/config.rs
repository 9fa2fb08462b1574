//! Config file parsing and validation.
//!
//! The file holds one `<host>.<key>=<value>` pair per line. Only the lines
//! whose host matches the origin being proxied are taken into account, so a
//! single file can serve several sites.

use crate::api_defaults::{
    DEFAULT_CACHE_PREFIX, DEFAULT_CACHE_VERSION, DEFAULT_FETCH_TIMEOUT, DEFAULT_MANIFEST,
    DEFAULT_NOTIFICATION_ICON,
};
use crate::error::{self, AddContext, ProxyError};
use crate::time::Seconds;
use crate::Result;
use std::{collections::HashMap, io::Read};

pub trait ConfigProperties: Send + Sync {
    fn cache_location(&self) -> &str;
    fn cache_prefix(&self) -> &str {
        DEFAULT_CACHE_PREFIX
    }
    fn version(&self) -> &str {
        DEFAULT_CACHE_VERSION
    }
    fn manifest(&self) -> Vec<String> {
        DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect()
    }
    fn fetch_timeout(&self) -> Seconds {
        Seconds::try_from(DEFAULT_FETCH_TIMEOUT).unwrap_or_default()
    }
    fn icon(&self) -> &str {
        DEFAULT_NOTIFICATION_ICON
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    cache_location: String,
    cache_prefix: String,
    version: String,
    manifest: Vec<String>,
    fetch_timeout: Seconds,
    icon: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_location: String::new(),
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            version: DEFAULT_CACHE_VERSION.to_string(),
            manifest: DEFAULT_MANIFEST.iter().map(|s| s.to_string()).collect(),
            fetch_timeout: Seconds::new(30),
            icon: DEFAULT_NOTIFICATION_ICON.to_string(),
        }
    }
}

impl Config {
    pub fn new<T: Read>(reader: T, host: &str) -> Result<Self> {
        let host_config_data = Config::parse(reader, host)?;
        let cache_location = host_config_data.get("cache_location").ok_or_else(|| {
            ProxyError::ConfigurationError(format!(
                "No cache_location found for host {host} in config"
            ))
        })?;
        let defaults = Config::default();
        let cache_prefix = host_config_data
            .get("cache_prefix")
            .cloned()
            .unwrap_or(defaults.cache_prefix);
        let version = host_config_data
            .get("version")
            .cloned()
            .unwrap_or(defaults.version);
        let manifest = host_config_data
            .get("manifest")
            .map(|manifest| Config::manifest_entries(manifest))
            .unwrap_or(defaults.manifest);
        let fetch_timeout = match host_config_data.get("fetch_timeout") {
            Some(timeout) => Seconds::try_from(timeout.as_str()).err_context(format!(
                "Cannot read fetch timeout. Make sure the key \
                 {host}.fetch_timeout has a valid time format."
            ))?,
            None => defaults.fetch_timeout,
        };
        let icon = host_config_data
            .get("icon")
            .cloned()
            .unwrap_or(defaults.icon);

        Ok(Config {
            cache_location: cache_location.to_string(),
            cache_prefix,
            version,
            manifest,
            fetch_timeout,
            icon,
        })
    }

    /// Config without a file, backed by the given cache location.
    pub fn with_cache_location(cache_location: &str) -> Self {
        Config {
            cache_location: cache_location.to_string(),
            ..Config::default()
        }
    }

    fn manifest_entries(manifest: &str) -> Vec<String> {
        manifest
            .split('|')
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.to_string())
            .collect()
    }

    fn parse<T: Read>(mut reader: T, host: &str) -> Result<HashMap<String, String>> {
        let mut config_data = String::new();
        reader.read_to_string(&mut config_data)?;
        let regex = regex::Regex::new(&format!(
            r"^{}\.(?P<key>\w+)\s*=\s*(?P<value>.*)$",
            regex::escape(host)
        ))?;
        let mut host_config = HashMap::new();
        for line in config_data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // capture groups key and value from regex
            if let Some(captured_names) = regex.captures(line) {
                if let (Some(key), Some(value)) =
                    (captured_names.name("key"), captured_names.name("value"))
                {
                    host_config
                        .insert(key.as_str().to_string(), value.as_str().trim().to_string());
                }
            }
        }
        if host_config.is_empty() {
            return Err(error::gen(format!("No config data found for host {host}")));
        }
        Ok(host_config)
    }
}

impl ConfigProperties for Config {
    fn cache_location(&self) -> &str {
        &self.cache_location
    }

    fn cache_prefix(&self) -> &str {
        &self.cache_prefix
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn manifest(&self) -> Vec<String> {
        self.manifest.clone()
    }

    fn fetch_timeout(&self) -> Seconds {
        self.fetch_timeout
    }

    fn icon(&self) -> &str {
        &self.icon
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_config_ok() {
        let config_data = r#"
        loquievents.no.cache_location=/home/user/.cache/oproxy
        loquievents.no.cache_prefix=loqui
        loquievents.no.version=v3
        loquievents.no.fetch_timeout=10s
        "#;
        let config = Config::new(config_data.as_bytes(), "loquievents.no").unwrap();
        assert_eq!("/home/user/.cache/oproxy", config.cache_location());
        assert_eq!("loqui", config.cache_prefix());
        assert_eq!("v3", config.version());
        assert_eq!(Seconds::new(10), config.fetch_timeout());
        assert_eq!(DEFAULT_MANIFEST.len(), config.manifest().len());
        assert_eq!(DEFAULT_NOTIFICATION_ICON, config.icon());
    }

    #[test]
    fn test_config_ignores_other_hosts_and_comments() {
        let config_data = r#"
        # staging site
        staging.loquievents.no.cache_location=/tmp/staging
        #loquievents.no.version=v9
        loquievents.no.cache_location=/tmp/prod
        "#;
        let config = Config::new(config_data.as_bytes(), "loquievents.no").unwrap();
        assert_eq!("/tmp/prod", config.cache_location());
        assert_eq!(DEFAULT_CACHE_VERSION, config.version());
    }

    #[test]
    fn test_host_dots_are_literal() {
        let config_data = "loquieventsXno.cache_location=/tmp/other";
        assert!(Config::new(config_data.as_bytes(), "loquievents.no").is_err());
    }

    #[test]
    fn test_no_cache_location_is_error() {
        let config_data = "loquievents.no.version=v2";
        let err = Config::new(config_data.as_bytes(), "loquievents.no").unwrap_err();
        assert!(err.to_string().contains("cache_location"));
    }

    #[test]
    fn test_invalid_fetch_timeout_is_error() {
        let config_data = r#"
        loquievents.no.cache_location=/tmp/prod
        loquievents.no.fetch_timeout=soon
        "#;
        assert!(Config::new(config_data.as_bytes(), "loquievents.no").is_err());
    }

    #[test]
    fn test_manifest_override() {
        let config_data = r#"
        loquievents.no.cache_location=/tmp/prod
        loquievents.no.manifest=/| /index.html ||/optimized/Portrett bilde, Sandra.webp|https://cdn.example.com/app.css
        "#;
        let config = Config::new(config_data.as_bytes(), "loquievents.no").unwrap();
        assert_eq!(
            vec![
                "/",
                "/index.html",
                "/optimized/Portrett bilde, Sandra.webp",
                "https://cdn.example.com/app.css"
            ],
            config.manifest()
        );
    }

    #[test]
    fn test_empty_config_is_error() {
        assert!(Config::new("".as_bytes(), "loquievents.no").is_err());
    }
}
