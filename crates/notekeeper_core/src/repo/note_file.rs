//! Durable note storage contracts and JSON file implementation.
//!
//! # Responsibility
//! - Read and write the whole note collection as one JSON array.
//! - Keep file-system and serialization details out of `NoteStore`.
//!
//! # Invariants
//! - Writes replace the target atomically (temp file in the same directory,
//!   fsync, rename). Readers never observe a partial file.
//! - Reads distinguish "absent" (`Ok(None)`) from unreadable or corrupt data.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Quarantine never overwrites an earlier backup.

use crate::model::note::{validate_collection, Note, NoteValidationError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

const WRITE_MAX_ATTEMPTS: u32 = 3;
const WRITE_RETRY_BACKOFF: Duration = Duration::from_millis(25);

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-level failure.
#[derive(Debug)]
pub enum StorageError {
    /// The storage medium could not be read or written.
    Io(io::Error),
    /// The stored bytes are not a JSON note array.
    Corrupt(serde_json::Error),
    /// The stored array parsed but violates collection invariants.
    Invalid(NoteValidationError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "note storage io error: {err}"),
            Self::Corrupt(err) => write!(f, "note storage is corrupt: {err}"),
            Self::Invalid(err) => write!(f, "note storage holds invalid data: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Corrupt(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Corrupt(value)
    }
}

impl From<NoteValidationError> for StorageError {
    fn from(value: NoteValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Whole-collection storage interface.
pub trait NoteStorage {
    /// Reads the full collection. `Ok(None)` means storage does not exist yet.
    fn read_all(&self) -> StorageResult<Option<Vec<Note>>>;
    /// Replaces the full collection.
    fn write_all(&self, notes: &[Note]) -> StorageResult<()>;
    /// Moves unreadable data aside so it can be inspected later.
    ///
    /// Returns the backup location when something was moved, `None` when
    /// there was nothing to move.
    fn quarantine(&self) -> StorageResult<Option<PathBuf>> {
        Ok(None)
    }
}

/// JSON file-backed note storage.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn write_once(&self, payload: &[u8]) -> io::Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(payload)?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl NoteStorage for JsonFileStorage {
    fn read_all(&self) -> StorageResult<Option<Vec<Note>>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        // Parse bytes so invalid UTF-8 surfaces as `Corrupt`, not `Io`.
        let notes: Vec<Note> = serde_json::from_slice(&raw)?;
        validate_collection(&notes)?;
        Ok(Some(notes))
    }

    fn write_all(&self, notes: &[Note]) -> StorageResult<()> {
        let started_at = Instant::now();
        let payload = serde_json::to_vec_pretty(notes)?;

        match with_write_retry(|| self.write_once(&payload)) {
            Ok(attempts) => {
                info!(
                    "event=storage_write module=repo status=ok count={} attempts={} duration_ms={}",
                    notes.len(),
                    attempts,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_write module=repo status=error attempts={} duration_ms={} error_code=write_failed error={}",
                    WRITE_MAX_ATTEMPTS,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn quarantine(&self) -> StorageResult<Option<PathBuf>> {
        if fs::symlink_metadata(&self.path).is_err() {
            return Ok(None);
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "notes.json".to_string());
        let backup = unused_backup_path(&self.parent_dir(), &file_name);
        fs::rename(&self.path, &backup)?;
        warn!(
            "event=storage_quarantine module=repo status=ok backup={}",
            backup.display()
        );
        Ok(Some(backup))
    }
}

/// Runs `op` up to `WRITE_MAX_ATTEMPTS` times with linear backoff.
///
/// Returns the number of attempts used on success.
fn with_write_retry(mut op: impl FnMut() -> io::Result<()>) -> io::Result<u32> {
    let mut attempt = 1;
    loop {
        match op() {
            Ok(()) => return Ok(attempt),
            Err(err) if attempt < WRITE_MAX_ATTEMPTS => {
                warn!(
                    "event=storage_write module=repo status=retry attempt={} error={}",
                    attempt, err
                );
                thread::sleep(WRITE_RETRY_BACKOFF * attempt);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Picks `<name>.corrupt-<epoch_ms>`, adding `-<n>` until the name is free.
fn unused_backup_path(dir: &Path, file_name: &str) -> PathBuf {
    let stem = format!("{file_name}.corrupt-{}", epoch_millis());
    let mut candidate = dir.join(&stem);
    let mut suffix = 1u32;
    while fs::symlink_metadata(&candidate).is_ok() {
        candidate = dir.join(format!("{stem}-{suffix}"));
        suffix += 1;
    }
    candidate
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
