use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::cache::CacheStorage;
use crate::cli::cache::CacheOptions;
use crate::cmds::common;
use crate::config::{Config, ConfigProperties};
use crate::proxy::PartitionNames;
use crate::Result;

pub fn execute<W: Write>(
    options: CacheOptions,
    config: Arc<Config>,
    no_cache: bool,
    writer: &mut W,
) -> Result<()> {
    match options {
        CacheOptions::List => {
            let names = PartitionNames::new(config.cache_prefix(), config.version());
            let storage = common::storage(config, no_cache)?;
            list_partitions(storage.as_ref(), &names, writer)
        }
        CacheOptions::Info => {
            if no_cache {
                writeln!(writer, "Cache disabled")?;
                return Ok(());
            }
            let location = Path::new(config.cache_location());
            let size = get_cache_directory_size(location)?;
            writeln!(writer, "Location: {}", location.display())?;
            writeln!(writer, "Version: {}", config.version())?;
            writeln!(writer, "Size: {}", BytesToHumanReadable::from(size))?;
            Ok(())
        }
    }
}

fn list_partitions<W: Write>(
    storage: &dyn CacheStorage,
    names: &PartitionNames,
    writer: &mut W,
) -> Result<()> {
    let partitions = storage.names()?;
    if partitions.is_empty() {
        writeln!(writer, "No cache partitions found.")?;
        return Ok(());
    }
    for name in partitions {
        let entries = storage.open(&name)?.len()?;
        let state = if names.is_current(&name) {
            "current"
        } else {
            "stale"
        };
        writeln!(writer, "{name} | {entries} entries | {state}")?;
    }
    Ok(())
}

struct BytesToHumanReadable(u64);

impl From<u64> for BytesToHumanReadable {
    fn from(size: u64) -> Self {
        BytesToHumanReadable(size)
    }
}

impl fmt::Display for BytesToHumanReadable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let suffixes = ["B", "KB", "MB", "GB"];
        let mut size = self.0 as f64;
        let mut i = 0;
        while size >= 1024.0 && i < suffixes.len() - 1 {
            size /= 1024.0;
            i += 1;
        }
        write!(f, "{:.2} {}", size, suffixes[i])
    }
}

// Partitions are directories, so walk them.
fn get_cache_directory_size(path: &Path) -> Result<u64> {
    let mut size = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            size += get_cache_directory_size(&entry.path())?;
        } else {
            size += metadata.len();
        }
    }
    Ok(size)
}
