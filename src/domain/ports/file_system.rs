//! File system capabilities
//!
//! Each host operation is its own trait so a host can provide any subset of
//! them. Paths are compiler file names (`/`-separated strings).

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(String),
    /// Permission denied
    PermissionDenied(String),
    /// I/O error
    Io(std::io::Error),
    /// Other error
    Other(String),
}

impl FsError {
    /// Attach `path` to an I/O error.
    pub fn from_io(err: std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_string()),
            _ => FsError::Io(err),
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::from_io(err, "")
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path),
            FsError::PermissionDenied(path) => write!(f, "Permission denied: {}", path),
            FsError::Io(err) => write!(f, "I/O error: {}", err),
            FsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {}

pub trait FileReader {
    /// Read a file as text. `Ok(None)` when it does not exist.
    fn read_file(&self, path: &str, encoding: Option<&str>) -> FsResult<Option<String>>;
}

pub trait FileWriter {
    /// Write `data`, prefixed with a byte order mark when asked.
    fn write_file(&self, path: &str, data: &str, write_byte_order_mark: bool) -> FsResult<()>;

    /// Create a single directory whose parent exists.
    fn create_directory(&self, path: &str) -> FsResult<()>;
}

/// Directory structure queries.
pub trait DirectoryReader {
    fn file_exists(&self, path: &str) -> bool;

    fn directory_exists(&self, path: &str) -> bool;

    /// Names of the immediate subdirectories of `path`.
    fn get_directories(&self, path: &str) -> Vec<String>;

    /// Files under `path` (recursively) whose extension is one of `extensions`.
    fn read_directory(&self, path: &str, extensions: &[String]) -> Vec<String>;
}

pub trait Realpath {
    /// Resolve symlinks in `path`; returns `path` unchanged when it cannot.
    fn realpath(&self, path: &str) -> String;
}
