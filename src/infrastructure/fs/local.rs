//! Local File System Implementation
//!
//! Implements the file system ports for local disk operations. Compiler file
//! names always use `/`; conversion to native paths happens here.

use std::io::Write;
use std::path::Path;

use ignore::WalkBuilder;
use tempfile::NamedTempFile;

use crate::domain::ports::{DirectoryReader, FileReader, FileWriter, FsError, FsResult, Realpath};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Local file system implementation
///
/// Writes are atomic: output goes to a temporary file in the target
/// directory which is then renamed over the destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

/// Compiler file name of a native path.
pub fn to_file_name(path: &Path) -> String {
    let name = path.to_string_lossy();
    if cfg!(windows) {
        name.replace('\\', "/")
    } else {
        name.into_owned()
    }
}

impl FileReader for LocalFs {
    fn read_file(&self, path: &str, encoding: Option<&str>) -> FsResult<Option<String>> {
        if let Some(encoding) = encoding {
            if !encoding.eq_ignore_ascii_case("utf-8") && !encoding.eq_ignore_ascii_case("utf8") {
                log::debug!("unsupported charset '{encoding}', reading {path} as UTF-8");
            }
        }
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(FsError::from_io(e, path)),
        };
        let text = String::from_utf8(bytes)
            .map_err(|_| FsError::Other(format!("'{path}' is not valid UTF-8")))?;
        Ok(Some(match text.strip_prefix(BYTE_ORDER_MARK) {
            Some(rest) => rest.to_string(),
            None => text,
        }))
    }
}

impl FileWriter for LocalFs {
    fn write_file(&self, path: &str, data: &str, write_byte_order_mark: bool) -> FsResult<()> {
        let target = Path::new(path);
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(FsError::NotFound(to_file_name(parent)));
        }

        let mut file = NamedTempFile::new_in(parent).map_err(|e| FsError::from_io(e, path))?;
        if write_byte_order_mark {
            write!(file, "{BYTE_ORDER_MARK}").map_err(|e| FsError::from_io(e, path))?;
        }
        file.write_all(data.as_bytes())
            .map_err(|e| FsError::from_io(e, path))?;
        file.persist(target)
            .map_err(|e| FsError::from_io(e.error, path))?;
        log::trace!("wrote {path}");
        Ok(())
    }

    fn create_directory(&self, path: &str) -> FsResult<()> {
        match std::fs::create_dir(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(FsError::from_io(e, path)),
        }
    }
}

impl DirectoryReader for LocalFs {
    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn directory_exists(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn get_directories(&self, path: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(path) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Hidden entries and anything matched by `.gitignore` files are skipped.
    fn read_directory(&self, path: &str, extensions: &[String]) -> Vec<String> {
        let mut files: Vec<String> = WalkBuilder::new(path)
            .require_git(false)
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::debug!("skipping entry under {path}: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| to_file_name(entry.path()))
            .filter(|name| {
                extensions
                    .iter()
                    .any(|extension| name.ends_with(&format!(".{extension}")))
            })
            .collect();
        files.sort();
        files
    }
}

impl Realpath for LocalFs {
    fn realpath(&self, path: &str) -> String {
        match canonical_native_path(path) {
            Some(real) => real,
            None => path.to_string(),
        }
    }
}

fn canonical_native_path(path: &str) -> Option<String> {
    let real = std::fs::canonicalize(path).ok()?;
    let name = to_file_name(&real);
    Some(match name.strip_prefix("//?/") {
        Some(stripped) => stripped.to_string(),
        None => name,
    })
}
