//! Output naming and text production.
//!
//! Output is the source text with the configured line endings; declaration
//! output keeps only the module surface (imports, exports, ambient
//! declarations and triple-slash directives).

use crate::domain::value_objects::path::{change_extension, convert_to_relative_path, is_rooted, normalize_path};
use crate::domain::value_objects::CompilerOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct OutputPaths {
    pub javascript: String,
    pub declaration: String,
}

/// Where the outputs of `file_name` go.
///
/// Under `out_dir` the layout below `root_dir` (default: the current
/// directory) is kept; a file outside `root_dir` lands at the top of
/// `out_dir`.
pub(super) fn output_paths(file_name: &str, options: &CompilerOptions, current_directory: &str) -> OutputPaths {
    let base = match &options.out_dir {
        Some(out_dir) => {
            let root_dir = options.root_dir.as_deref().unwrap_or(current_directory);
            let relative = convert_to_relative_path(file_name, root_dir, |s| s.to_string());
            let relative = if relative.starts_with("..") || is_rooted(&relative) {
                file_name.rsplit('/').next().unwrap_or(file_name).to_string()
            } else {
                relative
            };
            normalize_path(&format!("{}/{relative}", out_dir.trim_end_matches('/')))
        }
        None => file_name.to_string(),
    };
    OutputPaths {
        javascript: change_extension(&base, ".js"),
        declaration: change_extension(&base, ".d.ts"),
    }
}

/// `text` with every line ending replaced by `new_line`.
pub(super) fn javascript(text: &str, new_line: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        out.push_str(line.trim_end_matches(['\r', '\n']));
        if line.ends_with('\n') {
            out.push_str(new_line);
        }
    }
    out
}

pub(super) fn declarations(text: &str, new_line: &str) -> String {
    let surface: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| {
            let line = line.trim_start();
            ["import ", "export ", "declare ", "///"]
                .iter()
                .any(|prefix| line.starts_with(prefix))
        })
        .collect();
    if surface.is_empty() {
        return format!("export {{}};{new_line}");
    }
    let mut out = surface.join(new_line);
    out.push_str(new_line);
    out
}
