use oxttl::TurtleSyntaxError;
use std::io;
use std::path::PathBuf;

/// An error raised while loading a shape document or one of its imports.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The shape document does not exist.
    #[error("Shape document {} not found", path.display())]
    NotFound { path: PathBuf },
    /// The shape document exists but could not be read as UTF-8 text.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The shape document is not valid Turtle.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: TurtleSyntaxError,
    },
    /// The path can not be turned into a `file:` base IRI.
    #[error("{} can not be used as a base IRI", path.display())]
    InvalidPath { path: PathBuf },
    /// An imported document is missing and the loader is strict.
    #[error("{} imports {} which does not exist", importer.display(), target.display())]
    MissingImport { importer: PathBuf, target: PathBuf },
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}
