/// Errors surfaced by the core.
///
/// Only problems that stop a scan outright are errors. Anything that goes
/// wrong for a single entry becomes a warning on the scanner instead.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The root path could not be made absolute.
    #[error("cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root path could not be statted (missing, denied, I/O failure).
    #[error("cannot stat {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The worker pool for the scan could not be created.
    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The background scan thread could not be started.
    #[error("failed to spawn scanner thread: {0}")]
    Spawn(#[source] io::Error),

    /// The background scan thread went away without reporting.
    #[error("scanner thread exited without reporting a result")]
    Disconnected,
}

impl ScanError {
    /// `true` if the error concerns the scan root rather than the process.
    pub fn is_root_error(&self) -> bool {
        matches!(self, Self::Resolve { .. } | Self::Root { .. })
    }

    /// The underlying I/O error kind for root errors.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Resolve { source, .. } | Self::Root { source, .. } | Self::Spawn(source) => {
                Some(source.kind())
            }
            Self::ThreadPool(_) | Self::Disconnected => None,
        }
    }
}
