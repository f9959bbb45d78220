//! Renter record files.
//!
//! Each renter lives in `<dir>/<email>.json`. Saves go through a temp file in
//! the same directory followed by a rename, so a failed write never leaves a
//! truncated record behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rentnotice_core::RenterRecord;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::StoreError;

const INDENT: &[u8] = b"    ";

/// Path of the record file for `email` inside `dir`.
pub fn record_path(dir: &Path, email: &str) -> PathBuf {
    dir.join(format!("{email}.json"))
}

/// Read and parse a renter record.
pub fn load(path: &Path) -> Result<RenterRecord, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let record: RenterRecord =
        serde_json::from_slice(&bytes).map_err(|source| StoreError::MalformedRecord {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), renter = %record.email, "loaded renter record");
    Ok(record)
}

/// Write `record` to `path`, replacing any previous content atomically.
///
/// Keys come out sorted with 4-space indentation. Permissions of an existing
/// file are carried over to the replacement.
pub fn save(record: &RenterRecord, path: &Path) -> Result<(), StoreError> {
    let bytes = to_pretty_json(record)?;

    let io_err = |source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), renter = %record.email, "saved renter record");
    Ok(())
}

fn to_pretty_json(record: &RenterRecord) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    record.serialize(&mut ser).map_err(StoreError::Serialize)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Directory of renter records keyed by email.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the current working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn path_for(&self, email: &str) -> PathBuf {
        record_path(&self.dir, email)
    }

    pub fn load(&self, email: &str) -> Result<RenterRecord, StoreError> {
        load(&self.path_for(email))
    }

    /// Save `record` under the file for `email`.
    ///
    /// `email` is the key the record was loaded with, which is not
    /// necessarily `record.email`.
    pub fn save(&self, email: &str, record: &RenterRecord) -> Result<(), StoreError> {
        save(record, &self.path_for(email))
    }
}
