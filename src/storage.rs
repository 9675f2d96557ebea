//! Local key-value persistence.
//!
//! Each key is one JSON file under the data directory. Writes take an
//! exclusive `fs2` lock on a sidecar lock file and replace the value file
//! by rename, so a concurrent reader sees either the old or the new value.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::board::wip::WipLimits;
use crate::errors::BoardError;

/// Storage key of the WIP limits document.
pub const WIP_LIMITS_KEY: &str = "goals-okr.kanban.wip-limits";

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    fn lock_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.lock", sanitize_key(key)))
    }

    /// Raw value for `key`, `None` when never written.
    pub fn get(&self, key: &str) -> Result<Option<String>, BoardError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BoardError::Storage { path, source }),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), BoardError> {
        fs::create_dir_all(&self.dir).map_err(|source| BoardError::Storage {
            path: self.dir.clone(),
            source,
        })?;

        let _lock = self.lock(key)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|source| BoardError::Storage {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), BoardError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(());
        }
        let _lock = self.lock(key)?;
        fs::remove_file(&path).map_err(|source| BoardError::Storage { path, source })
    }

    /// Exclusive lock held until the returned file is dropped.
    fn lock(&self, key: &str) -> Result<File, BoardError> {
        let path = self.lock_path(key);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| BoardError::Storage {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| BoardError::Storage { path, source })?;
        Ok(file)
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// WIP limits persisted under [`WIP_LIMITS_KEY`].
#[derive(Debug, Clone)]
pub struct WipLimitStore {
    store: LocalStore,
}

impl WipLimitStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn path(&self) -> PathBuf {
        self.store.path_for(WIP_LIMITS_KEY)
    }

    /// Missing or unreadable content loads as "no limits".
    pub fn load(&self) -> WipLimits {
        let raw = match self.store.get(WIP_LIMITS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return WipLimits::default(),
            Err(err) => {
                tracing::warn!(%err, "could not read WIP limits; using none");
                return WipLimits::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(limits) => limits,
            Err(err) => {
                tracing::warn!(
                    %err,
                    path = %self.path().display(),
                    "corrupt WIP limits; using none"
                );
                WipLimits::default()
            }
        }
    }

    pub fn save(&self, limits: &WipLimits) -> Result<(), BoardError> {
        let json = serde_json::to_string_pretty(limits)
            .map_err(|e| {
                BoardError::Other(anyhow::anyhow!("Failed to serialize WIP limits: {}", e))
            })?;
        self.store.set(WIP_LIMITS_KEY, &json)
    }

    pub fn clear(&self) -> Result<(), BoardError> {
        self.store.remove(WIP_LIMITS_KEY)
    }
}
