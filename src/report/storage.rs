//! # Storage collaborator for diagnostic reports.
//!
//! [`Storage`] abstracts the three things the report writer needs from the
//! host: "is durable storage usable right now", "where do reports go", and
//! "write these bytes there".
//!
//! [`FsStorage`] is the default implementation over the local filesystem.
//! Directory creation uses `create_dir_all`, which is idempotent and tolerates
//! another thread creating the same directory concurrently.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReportError;

/// Directory name appended to the platform cache directory.
const APP_DIR: &str = "faultvisor";

/// Storage used by [`ReportWriter`](crate::ReportWriter).
///
/// Implementations are called from inside the panic hook: they must report
/// failures through `Result`, never by panicking.
pub trait Storage: Send + Sync + 'static {
    /// Whether durable storage is currently usable. When `false` the report is
    /// skipped without error.
    fn is_available(&self) -> bool;

    /// Returns the report directory, creating it if absent.
    fn resolve_dir(&self) -> Result<PathBuf, ReportError>;

    /// Writes `bytes` to `path`, replacing any existing file.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ReportError>;
}

/// Filesystem storage rooted at a fixed directory.
#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Storage rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage rooted at `<platform cache dir>/faultvisor`, or
    /// `<temp dir>/faultvisor` when the platform has no cache directory.
    pub fn platform_default() -> Self {
        let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join(APP_DIR))
    }

    /// Root directory reports are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl Storage for FsStorage {
    /// Available when the nearest existing ancestor of the root is a directory,
    /// i.e. the root exists or could be created beneath a mounted directory.
    fn is_available(&self) -> bool {
        self.root
            .ancestors()
            .find(|p| p.exists())
            .is_some_and(Path::is_dir)
    }

    fn resolve_dir(&self) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.root).map_err(|source| ReportError::CreateDir {
            path: self.root.clone(),
            source,
        })?;
        Ok(self.root.clone())
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
        fs::write(path, bytes).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
