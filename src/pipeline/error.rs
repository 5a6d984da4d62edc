use std::io;
use std::path::{Path, PathBuf};

/// A fatal error while running a build unit.
///
/// Minification problems aren't errors: they're reported
/// as [crate::proc::Diagnostic]s in the unit's outcome.
#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    /// The compiled output file doesn't exist.
    #[error("source file does not exist: {}", path.display())]
    MissingSource { path: PathBuf },

    /// The compiled output file exists but couldn't be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The compiled output file contained data that wasn't UTF-8 text.
    #[error("{} does not contain UTF-8 text", path.display())]
    NonTextualSource { path: PathBuf },

    /// The minified artifact couldn't be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The gzip artifact couldn't be written.
    #[error("failed to write gzip file {}: {source}", path.display())]
    WriteGzip {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MinifyError {
    /// Returns the path of the file the error occurred on.
    pub fn path(&self) -> &Path {
        match self {
            MinifyError::MissingSource { path }
            | MinifyError::ReadSource { path, .. }
            | MinifyError::NonTextualSource { path }
            | MinifyError::WriteArtifact { path, .. }
            | MinifyError::WriteGzip { path, .. } => path,
        }
    }
}
