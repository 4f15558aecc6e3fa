//! Single panel instance lock using a Unix socket.
//!
//! Two panels writing the same repository file would overwrite each other's
//! snapshots, so the lock is keyed on the canonical repository path. Panels
//! without a repository file lock on their name instead. The socket is
//! released by the OS when the process dies, so a crash never leaves a stale
//! lock behind.

use sha2::{Digest, Sha256};
use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceLockError {
    #[error("another panel already holds lock '{0}'")]
    AlreadyRunning(String),

    #[error("failed to acquire panel lock: {0}")]
    Io(#[from] io::Error),
}

/// Held for as long as the panel runs; the socket file is removed on drop.
pub struct InstanceLock {
    _listener: UnixListener,
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock named `panel` in the runtime directory.
    /// Use [`lock_name`] to derive the name from the panel configuration.
    pub fn acquire(panel: &str) -> Result<Self, InstanceLockError> {
        Self::acquire_at(panel, &runtime_dir())
    }

    pub fn acquire_at(panel: &str, dir: &Path) -> Result<Self, InstanceLockError> {
        let path = socket_path_in(dir, panel);

        if path.exists() {
            match UnixStream::connect(&path) {
                Ok(_) => return Err(InstanceLockError::AlreadyRunning(panel.to_string())),
                // Nobody listening: left over from a killed process
                Err(_) => {
                    let _ = std::fs::remove_file(&path);
                }
            }
        }

        match UnixListener::bind(&path) {
            Ok(listener) => Ok(Self {
                _listener: listener,
                path,
            }),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                Err(InstanceLockError::AlreadyRunning(panel.to_string()))
            }
            Err(e) => Err(InstanceLockError::Io(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Lock name for a panel: derived from the repository file when there is one,
/// otherwise the panel name itself.
pub fn lock_name(panel: &str, repository: Option<&Path>) -> String {
    match repository {
        Some(path) => {
            let canonical = canonical_repository_path(path);
            let digest = Sha256::digest(canonical.as_os_str().as_encoded_bytes());
            format!("catpoint-repo-{}", &hex::encode(digest)[..16])
        }
        None => panel.to_string(),
    }
}

/// Absolute, symlink-free form of a repository path. The file itself may not
/// exist yet, so its parent directory is resolved instead.
fn canonical_repository_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// `$XDG_RUNTIME_DIR`, falling back to `/tmp`.
pub fn runtime_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Socket file for a panel; characters outside `[A-Za-z0-9_-]` become `_`.
pub fn socket_path_in(dir: &Path, panel: &str) -> PathBuf {
    let safe: String = panel
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join(format!("{safe}.sock"))
}
