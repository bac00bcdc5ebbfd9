pub mod filesystem;
pub mod interpreter;

pub use filesystem::FileSystemResolver;
pub use interpreter::Interpreter;

use crate::error::{Result, ScanError};
use std::path::PathBuf;
use thiserror::Error;

/// Why a candidate name could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no module named '{0}'")]
    NotFound(String),

    #[error("'{name}' is not importable: {reason}")]
    Failed { name: String, reason: String },
}

/// Supplies the directory to scan.
pub trait LibraryRootProvider {
    fn library_root(&self) -> Result<PathBuf>;
}

/// Decides whether a top-level name is importable in the host environment.
pub trait ModuleResolver {
    fn resolve(&self, name: &str) -> std::result::Result<(), ResolveError>;
}

impl<T: ModuleResolver + ?Sized> ModuleResolver for &T {
    fn resolve(&self, name: &str) -> std::result::Result<(), ResolveError> {
        (**self).resolve(name)
    }
}

impl<T: ModuleResolver + ?Sized> ModuleResolver for Box<T> {
    fn resolve(&self, name: &str) -> std::result::Result<(), ResolveError> {
        (**self).resolve(name)
    }
}

/// A root given explicitly, e.g. on the command line.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl LibraryRootProvider for FixedRoot {
    fn library_root(&self) -> Result<PathBuf> {
        if self.0.is_dir() {
            Ok(self.0.clone())
        } else {
            Err(ScanError::RootMissing(self.0.clone()))
        }
    }
}
