//! Directory-backed driver.
//!
//! Each key lives in its own file named after the hex encoding of the key.
//! Keys whose encoding would not fit in a file name are named after the hex
//! SHA-256 of the key instead, under a `h-` prefix no plain encoding can
//! produce. Writes go to a temporary file first and are renamed into place, so a
//! reader in another process sees either the old or the new value, never a
//! torn one. Read-modify-write sequences are still not atomic.

use crate::domain::{StoreError, StoreScope};
use crate::ports::StoreDriver;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const VALUE_EXTENSION: &str = "val";

/// Longest hex stem used verbatim. Leaves room for the temp-file decoration
/// within the usual 255-byte file name limit.
const MAX_PLAIN_STEM: usize = 160;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Driver storing one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileDriver {
    root: PathBuf,
    scope: StoreScope,
}

impl FileDriver {
    /// Create a driver rooted at `root`. The directory is created lazily by
    /// [`StoreDriver::available`] or the first write.
    pub fn new(root: impl Into<PathBuf>, scope: StoreScope) -> Self {
        Self {
            root: root.into(),
            scope,
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", Self::stem_for(key), VALUE_EXTENSION))
    }

    /// File name stem for `key`.
    fn stem_for(key: &str) -> String {
        let plain = hex::encode(key);
        if plain.len() <= MAX_PLAIN_STEM {
            plain
        } else {
            format!("h-{}", hex::encode(Sha256::digest(key.as_bytes())))
        }
    }

    fn io_error(key: &str, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl StoreDriver for FileDriver {
    fn name(&self) -> &'static str {
        "file"
    }

    fn scope(&self) -> StoreScope {
        self.scope
    }

    fn available(&self) -> bool {
        match fs::create_dir_all(&self.root) {
            Ok(()) => self.root.is_dir(),
            Err(e) => {
                debug!(root = %self.root.display(), error = %e, "File driver unavailable");
                false
            }
        }
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let bytes = match fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(key, e)),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| StoreError::Malformed {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| Self::io_error(key, e))?;

        let target = self.path_for(key);
        let temp = self.root.join(format!(
            ".{}.{}.{}.tmp",
            Self::stem_for(key),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        fs::write(&temp, value).map_err(|e| Self::io_error(key, e))?;
        if let Err(e) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(key, e));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Self::io_error("*", e)),
        };

        for entry in entries {
            let path = entry.map_err(|e| Self::io_error("*", e))?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Self::io_error("*", e)),
            }
        }
        Ok(())
    }
}
