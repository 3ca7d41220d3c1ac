//! Best-effort remote backup boundary.
//!
//! Pushes the current store contents to a remote content repository with
//! create-or-update-by-path semantics, keyed by the prior content hash when
//! updating. Every failure is caught here and surfaced as a non-fatal
//! warning; backup never blocks survey completion.

use std::cell::RefCell;
use std::collections::BTreeMap;

use muse_core::errors::{ErrorInfo, MuseError};
use sha2::{Digest, Sha256};

use crate::store::CsvStore;

/// Remote content repository the store is mirrored into.
pub trait RemoteBackup {
    /// Returns the content hash of the file currently at `path`, if any.
    fn existing_hash(&self, path: &str) -> Result<Option<String>, MuseError>;

    /// Creates or replaces the file at `path`. `prior_hash` must carry the
    /// hash returned by [`RemoteBackup::existing_hash`] when updating.
    fn put(&self, path: &str, content: &[u8], prior_hash: Option<&str>) -> Result<(), MuseError>;
}

/// Non-fatal warning describing a failed backup attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupWarning {
    pub message: String,
}

/// Computes the SHA-256 content hash used to key updates.
pub fn content_sha256(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Pushes the store file to the remote path. Returns a warning instead of
/// an error on any failure, including an unreadable local store.
pub fn backup_store(
    remote: &dyn RemoteBackup,
    store: &CsvStore,
    remote_path: &str,
) -> Option<BackupWarning> {
    let attempt = || -> Result<(), MuseError> {
        let table = store.load()?;
        let content = crate::store::export(&table)?;
        let prior = remote.existing_hash(remote_path)?;
        remote.put(remote_path, &content, prior.as_deref())
    };
    match attempt() {
        Ok(()) => None,
        Err(err) => {
            log::warn!("backup to {remote_path} failed: {err}");
            Some(BackupWarning {
                message: err.to_string(),
            })
        }
    }
}

/// In-memory backup target used by tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryBackup {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    /// When set, every call fails; exercises the warning path.
    fail: bool,
}

impl InMemoryBackup {
    /// Creates an empty backup target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a target whose every call fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The stored content at `path`, if any.
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }
}

impl RemoteBackup for InMemoryBackup {
    fn existing_hash(&self, path: &str) -> Result<Option<String>, MuseError> {
        if self.fail {
            return Err(MuseError::Backup(ErrorInfo::new(
                "remote-unavailable",
                "remote repository unreachable",
            )));
        }
        Ok(self.files.borrow().get(path).map(|c| content_sha256(c)))
    }

    fn put(&self, path: &str, content: &[u8], prior_hash: Option<&str>) -> Result<(), MuseError> {
        if self.fail {
            return Err(MuseError::Backup(ErrorInfo::new(
                "remote-unavailable",
                "remote repository unreachable",
            )));
        }
        let mut files = self.files.borrow_mut();
        if let Some(existing) = files.get(path) {
            let current = content_sha256(existing);
            if prior_hash != Some(current.as_str()) {
                return Err(MuseError::Backup(
                    ErrorInfo::new("hash-mismatch", "update not keyed by current content hash")
                        .with_context("path", path),
                ));
            }
        }
        files.insert(path.to_string(), content.to_vec());
        Ok(())
    }
}
