//! Compiler path helpers
//!
//! File names inside the compiler are `/`-separated strings regardless of
//! platform, so they compare and print the same everywhere. These helpers do
//! pure string work; nothing here touches the file system.

/// How file names are canonicalized for identity comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileNameCasing {
    case_sensitive: bool,
}

impl FileNameCasing {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Casing policy of the platform this binary was built for.
    pub fn platform() -> Self {
        Self::new(!cfg!(any(target_os = "windows", target_os = "macos")))
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Canonical form of `file_name` used as identity.
    pub fn canonicalize(&self, file_name: &str) -> String {
        if self.case_sensitive {
            file_name.to_string()
        } else {
            file_name.to_lowercase()
        }
    }
}

/// Replace `\` separators with `/`.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Length of the root prefix (`/`, `c:/`, `//server/`), 0 when relative.
pub fn root_length(path: &str) -> usize {
    let bytes = path.as_bytes();
    if bytes.first() == Some(&b'/') {
        if bytes.get(1) == Some(&b'/') {
            // UNC: //server/share/
            return path[2..].find('/').map_or(path.len(), |i| i + 3);
        }
        return 1;
    }
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return if bytes.get(2) == Some(&b'/') { 3 } else { 2 };
    }
    0
}

pub fn is_rooted(path: &str) -> bool {
    root_length(path) > 0
}

/// Join `relative` onto `base` unless it is already rooted.
pub fn combine_paths(base: &str, relative: &str) -> String {
    if base.is_empty() || is_rooted(relative) {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{relative}")
    } else {
        format!("{base}/{relative}")
    }
}

/// Collapse `.` and `..` segments and duplicate separators.
pub fn normalize_path(path: &str) -> String {
    let path = normalize_slashes(path);
    let root_len = root_length(&path);
    let (root, rest) = path.split_at(root_len);
    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if root.is_empty() && joined.is_empty() {
        ".".to_string()
    } else {
        format!("{root}{joined}")
    }
}

/// Normalized absolute form of `file_name` resolved against `current_directory`.
pub fn normalized_absolute_path(file_name: &str, current_directory: &str) -> String {
    normalize_path(&combine_paths(
        &normalize_slashes(current_directory),
        &normalize_slashes(file_name),
    ))
}

/// Directory part of a path (everything before the last separator).
pub fn directory_path(path: &str) -> String {
    let path = normalize_slashes(path);
    let root_len = root_length(&path);
    match path[root_len..].rfind('/') {
        Some(i) => path[..root_len + i].to_string(),
        None => path[..root_len].to_string(),
    }
}

/// Express `path` relative to `directory` when it is rooted.
///
/// Components are compared through `canonicalize`, so case-insensitive file
/// systems relate `C:/Src/a.ts` to `c:/src`. Paths on a different root than
/// `directory` are returned absolute.
pub fn convert_to_relative_path(
    path: &str,
    directory: &str,
    canonicalize: impl Fn(&str) -> String,
) -> String {
    if !is_rooted(path) {
        return path.to_string();
    }
    let from = normalize_path(directory);
    let to = normalize_path(path);
    let from_root = &from[..root_length(&from)];
    let to_root = &to[..root_length(&to)];
    if canonicalize(from_root) != canonicalize(to_root) {
        return to;
    }

    let from_parts: Vec<&str> = from[from_root.len()..].split('/').filter(|p| !p.is_empty()).collect();
    let to_parts: Vec<&str> = to[to_root.len()..].split('/').filter(|p| !p.is_empty()).collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| canonicalize(a) == canonicalize(b))
        .count();

    let mut relative: Vec<&str> = vec![".."; from_parts.len() - common];
    relative.extend(&to_parts[common..]);
    relative.join("/")
}

/// Replace the extension of `path` (the text after the last `.` of its file
/// name) with `extension`, which includes its leading dot.
pub fn change_extension(path: &str, extension: &str) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let base = match path[name_start..].find(".d.ts") {
        Some(i) if path[name_start + i..] == *".d.ts" => &path[..name_start + i],
        _ => match path[name_start..].rfind('.') {
            Some(i) if i > 0 => &path[..name_start + i],
            _ => path,
        },
    };
    format!("{base}{extension}")
}
