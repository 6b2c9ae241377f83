use std::path::PathBuf;

use crate::manifest::EntryKind;

/// The primary error type for all operations in the `xpipack` crate.
#[derive(Debug)]
pub enum PackError {
    /// An I/O error occurred, typically while reading a source file or
    /// writing the archive. Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// A manifest entry names a source path that does not exist. The run
    /// aborts before anything is written.
    MissingSource(PathBuf),

    /// A manifest entry's source exists on disk but is not the kind of
    /// filesystem object the entry declares.
    KindMismatch { path: PathBuf, expected: EntryKind },

    /// Two include entries mapped to the same archive path.
    DuplicateEntry(String),

    /// A manifest path is absolute, empty, or escapes the package root.
    InvalidManifestPath(PathBuf),

    /// An archive entry name could not be encoded because the source path
    /// is not valid UTF-8.
    NonUtf8Path(PathBuf),

    /// An error from the underlying `zip` crate while writing the archive.
    Zip(zip::result::ZipError),

    /// An error during deserialization of a JSON include manifest.
    SerdeJson(serde_json::Error),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            PackError::MissingSource(path) => write!(f, "Source path not found: '{}'", path.display()),
            PackError::KindMismatch { path, expected } => {
                let wanted = match expected {
                    EntryKind::Dir => "directory",
                    EntryKind::File => "regular file",
                };
                write!(f, "Source path '{}' is not a {}", path.display(), wanted)
            }
            PackError::DuplicateEntry(name) => write!(f, "Duplicate archive entry '{}'", name),
            PackError::InvalidManifestPath(path) => {
                write!(f, "Manifest path '{}' must be relative and must not contain '..'", path.display())
            }
            PackError::NonUtf8Path(path) => write!(f, "Path '{}' is not valid UTF-8", path.display()),
            PackError::Zip(e) => write!(f, "Archive write error: {}", e),
            PackError::SerdeJson(e) => write!(f, "Manifest parse error: {}", e),
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Io { source, .. } => Some(source),
            PackError::Zip(e) => Some(e),
            PackError::SerdeJson(e) => Some(e),
            _ => None,
        }
    }
}

impl PackError {
    /// Attach the offending path to a raw I/O error.
    pub(crate) fn io(source: std::io::Error, path: &std::path::Path) -> Self {
        PackError::Io { source, path: path.to_path_buf() }
    }
}

impl From<zip::result::ZipError> for PackError {
    fn from(err: zip::result::ZipError) -> Self {
        PackError::Zip(err)
    }
}

impl From<serde_json::Error> for PackError {
    fn from(err: serde_json::Error) -> Self {
        PackError::SerdeJson(err)
    }
}

// Generic IO error conversion that doesn't carry a path
impl From<std::io::Error> for PackError {
    fn from(err: std::io::Error) -> Self {
        PackError::Io { source: err, path: PathBuf::new() }
    }
}
