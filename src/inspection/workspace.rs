//! Read-only view of the build workspace.

use crate::error::{InspectionError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a workspace-relative path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Missing,
    Directory,
    File,
}

/// Workspace file access used by the file-mode reader.
pub trait Workspace: Send + Sync {
    /// Workspace root directory.
    fn root(&self) -> &Path;

    /// Classify a path relative to the root.
    fn probe(&self, relative: &str) -> Result<PathKind>;

    /// Read a whole file relative to the root.
    fn read_to_string(&self, relative: &str) -> Result<String>;

    /// Absolute location of a relative path.
    fn resolve(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }
}

/// Workspace on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Workspace for FsWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn probe(&self, relative: &str) -> Result<PathKind> {
        let path = self.resolve(relative);
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => Ok(PathKind::Directory),
            Ok(_) => Ok(PathKind::File),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PathKind::Missing),
            Err(source) => Err(InspectionError::Io { source, path }),
        }
    }

    fn read_to_string(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative);
        fs::read_to_string(&path).map_err(|source| InspectionError::Io { source, path })
    }
}
