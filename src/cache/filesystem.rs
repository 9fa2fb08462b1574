use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use crate::cache::{validate_partition_name, CacheStorage, Partition};
use crate::config::ConfigProperties;
use crate::error::{self, AddContext, ProxyError};
use crate::http::Headers;
use crate::io::Response;
use crate::Result;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistent storage. Each partition is a directory under the configured
/// cache location and each entry a gzip file named after the SHA-256 of its
/// key. Entries are written to a temporary file and renamed into place, so
/// concurrent readers see either the old or the new entry.
pub struct FileCache {
    config: Arc<dyn ConfigProperties>,
}

impl FileCache {
    pub fn new(config: Arc<dyn ConfigProperties>) -> Self {
        FileCache { config }
    }

    pub fn location(&self) -> &Path {
        Path::new(self.config.cache_location())
    }

    pub fn validate_cache_location(&self) -> Result<()> {
        let path = self.location();
        let cache_location = path.to_string_lossy();

        if !path.exists() {
            return Err(ProxyError::CacheLocationDoesNotExist(format!(
                "Cache directory does not exist: {cache_location}"
            ))
            .into());
        }

        if !path.is_dir() {
            return Err(ProxyError::CacheLocationIsNotADirectory(format!(
                "Cache location is not a directory: {cache_location}"
            ))
            .into());
        }

        // Check if we can write to the directory
        let test_file_path = path.join(".write_test_cache_file");
        File::create(&test_file_path).err_context(format!(
            "No write permission for cache directory {cache_location}"
        ))?;
        fs::remove_file(&test_file_path).err_context(format!(
            "Failed to remove cache test file {}",
            test_file_path.to_string_lossy()
        ))?;
        Ok(())
    }

    fn partition_dir(&self, name: &str) -> PathBuf {
        self.location().join(name)
    }
}

impl CacheStorage for FileCache {
    fn open(&self, name: &str) -> Result<Arc<dyn Partition>> {
        validate_partition_name(name)?;
        let dir = self.partition_dir(name);
        fs::create_dir_all(&dir)
            .err_context(format!("Cannot create cache partition {}", dir.display()))?;
        Ok(Arc::new(FilePartition { dir }))
    }

    fn delete(&self, name: &str) -> Result<bool> {
        validate_partition_name(name)?;
        let dir = self.partition_dir(name);
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .err_context(format!("Cannot delete cache partition {}", dir.display()))?;
        Ok(true)
    }

    fn names(&self) -> Result<Vec<String>> {
        let location = self.location();
        if !location.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(location)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_partition_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub struct FilePartition {
    dir: PathBuf,
}

impl FilePartition {
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key);
        let hash = hasher.finalize();
        self.dir.join(format!("{hash:x}"))
    }
}

impl Partition for FilePartition {
    fn get(&self, key: &str) -> Result<Option<Response>> {
        let path = self.entry_path(key);
        match File::open(&path) {
            Ok(f) => {
                let response = read_entry(BufReader::new(f))
                    .err_context(format!("Cannot read cache entry for {key}"))?;
                Ok(Some(response))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, key: &str, value: &Response) -> Result<()> {
        let path = self.entry_path(key);
        let tmp_path = self.dir.join(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let f = BufWriter::new(File::create(&tmp_path)?);
        if let Err(err) = write_entry(value, f) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err).err_context(format!("Cannot store cache entry for {key}"));
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_name().to_string_lossy().starts_with('.') {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Entry layout before compression: headers as a JSON line, status line,
/// raw body bytes.
fn write_entry<W: Write>(value: &Response, f: W) -> Result<()> {
    let headers = serde_json::to_string(&value.headers)?;
    let mut encoder = GzEncoder::new(f, Compression::default());
    encoder.write_all(format!("{}\n{}\n", headers, value.status).as_bytes())?;
    encoder.write_all(&value.body)?;
    encoder.finish()?.flush()?;
    Ok(())
}

fn read_entry(mut reader: impl BufRead) -> Result<Response> {
    let decompressed_data = GzDecoder::new(&mut reader);
    let mut reader = BufReader::new(decompressed_data);
    let mut headers = String::new();
    reader.read_line(&mut headers)?;
    let mut status_code = String::new();
    reader.read_line(&mut status_code)?;
    let status_code = status_code.trim();
    let status = status_code.parse::<u16>().map_err(|err| {
        ProxyError::CorruptCacheEntry(format!(
            "Could not parse the response status code {status_code:?}: {err}"
        ))
    })?;
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    let headers = serde_json::from_str::<Headers>(&headers)
        .map_err(|err| error::gen(format!("Could not parse cached headers: {err}")))?;
    let response = Response::builder()
        .status(status)
        .headers(headers)
        .body(body)
        .build()?;
    Ok(response)
}
