//! Module and type reference resolution
//!
//! Resolution reads only through the compiler host so programs built in
//! tests resolve against an in-memory file system.

use serde::Deserialize;

use crate::domain::entities::PackageId;
use crate::domain::ports::CompilerHost;
use crate::domain::value_objects::path::{combine_paths, directory_path, is_rooted, normalize_path};

/// Extensions tried, in order, for an extensionless specifier.
const SOURCE_EXTENSIONS: [&str; 3] = [".ts", ".tsx", ".d.ts"];

/// Environment variable naming the directory that holds `lib.<name>.d.ts` files.
pub const LIB_DIR_ENV: &str = "KILN_LIB_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub file_name: String,
    pub package_id: Option<PackageId>,
}

impl Resolved {
    fn local(file_name: String) -> Self {
        Self {
            file_name,
            package_id: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    types: Option<String>,
    typings: Option<String>,
    main: Option<String>,
}

pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || is_rooted(specifier)
}

/// Resolve an import specifier written in `containing_file`.
pub fn resolve_module(host: &dyn CompilerHost, specifier: &str, containing_file: &str) -> Option<Resolved> {
    let directory = directory_path(containing_file);
    if is_relative(specifier) {
        let candidate = normalize_path(&combine_paths(&directory, specifier));
        return load_file_or_directory(host, &candidate).map(Resolved::local);
    }
    let (package_name, sub_path) = split_package_specifier(specifier);
    ancestors(&directory).into_iter().find_map(|dir| {
        let package_dir = format!("{}/node_modules/{package_name}", dir.trim_end_matches('/'));
        resolve_in_package(host, &package_dir, sub_path)
    })
}

/// Resolve `/// <reference path="..." />`, which names a file directly.
pub fn resolve_reference_path(host: &dyn CompilerHost, reference: &str, containing_file: &str) -> Option<String> {
    let candidate = normalize_path(&combine_paths(&directory_path(containing_file), reference));
    if host.file_exists(&candidate) {
        Some(candidate)
    } else {
        load_file_or_directory(host, &candidate)
    }
}

/// Resolve a type reference (`types` option or `/// <reference types>`).
///
/// `type_roots` are searched first; without them every `node_modules/@types`
/// above `directory` is.
pub fn resolve_type_reference(
    host: &dyn CompilerHost,
    name: &str,
    directory: &str,
    type_roots: &[String],
) -> Option<Resolved> {
    let roots = if type_roots.is_empty() {
        default_type_roots(host, directory)
    } else {
        type_roots.to_vec()
    };
    roots.iter().find_map(|root| {
        let package_dir = format!("{}/{name}", root.trim_end_matches('/'));
        resolve_in_package(host, &package_dir, None)
    })
}

/// Every `node_modules/@types` directory at or above `directory`.
pub fn default_type_roots(host: &dyn CompilerHost, directory: &str) -> Vec<String> {
    ancestors(directory)
        .into_iter()
        .map(|dir| format!("{}/node_modules/@types", dir.trim_end_matches('/')))
        .filter(|root| host.directory_exists(root) == Some(true))
        .collect()
}

/// Package names directly under each type root, for automatic inclusion.
pub fn automatic_type_directive_names(host: &dyn CompilerHost, type_roots: &[String]) -> Vec<String> {
    let mut names: Vec<String> = type_roots
        .iter()
        .flat_map(|root| host.get_directories(root))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// File name of the default library `lib`, e.g. `es2020` becomes `lib.es2020.d.ts`.
pub fn lib_file_name(host: &dyn CompilerHost, lib: &str) -> String {
    let configured = host.get_environment_variable(LIB_DIR_ENV);
    let directory = if configured.is_empty() {
        format!("{}/node_modules/kiln/lib", host.current_directory().trim_end_matches('/'))
    } else {
        normalize_path(&combine_paths(&host.current_directory(), &configured))
    };
    let name = lib.trim_start_matches("lib.").trim_end_matches(".d.ts").to_lowercase();
    format!("{directory}/lib.{name}.d.ts")
}

fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let split_at = if specifier.starts_with('@') {
        specifier.match_indices('/').nth(1).map(|(i, _)| i)
    } else {
        specifier.find('/')
    };
    match split_at {
        Some(i) => (&specifier[..i], Some(&specifier[i + 1..])),
        None => (specifier, None),
    }
}

fn resolve_in_package(host: &dyn CompilerHost, package_dir: &str, sub_path: Option<&str>) -> Option<Resolved> {
    if host.directory_exists(package_dir) == Some(false) {
        return None;
    }
    let manifest = read_package_json(host, package_dir);
    let file_name = match sub_path {
        Some(sub) => load_file_or_directory(host, &format!("{package_dir}/{sub}")),
        None => load_directory(host, package_dir, manifest.as_ref()),
    }?;
    let package_id = manifest.and_then(|manifest| {
        Some(PackageId {
            name: manifest.name?,
            sub_module_name: sub_path.map(str::to_string),
            version: manifest.version?,
        })
    });
    Some(Resolved {
        file_name,
        package_id,
    })
}

fn read_package_json(host: &dyn CompilerHost, directory: &str) -> Option<PackageJson> {
    let path = format!("{directory}/package.json");
    let text = host.read_file(&path)?;
    match serde_json::from_str(&text) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            log::debug!("ignoring malformed {path}: {e}");
            None
        }
    }
}

fn load_file_or_directory(host: &dyn CompilerHost, candidate: &str) -> Option<String> {
    load_file(host, candidate).or_else(|| {
        let manifest = read_package_json(host, candidate);
        load_directory(host, candidate, manifest.as_ref())
    })
}

fn load_file(host: &dyn CompilerHost, candidate: &str) -> Option<String> {
    if SOURCE_EXTENSIONS.iter().any(|ext| candidate.ends_with(ext)) && host.file_exists(candidate) {
        return Some(candidate.to_string());
    }
    // `./a.js` in source refers to `./a.ts`
    let stem = candidate.strip_suffix(".js").unwrap_or(candidate);
    SOURCE_EXTENSIONS
        .iter()
        .map(|ext| format!("{stem}{ext}"))
        .find(|file| host.file_exists(file))
}

fn load_directory(host: &dyn CompilerHost, directory: &str, manifest: Option<&PackageJson>) -> Option<String> {
    let entry = manifest.and_then(|m| m.types.as_ref().or(m.typings.as_ref()).or(m.main.as_ref()));
    if let Some(entry) = entry {
        let candidate = normalize_path(&combine_paths(directory, entry));
        if let Some(file) = load_file(host, &candidate) {
            return Some(file);
        }
    }
    load_file(host, &format!("{}/index", directory.trim_end_matches('/')))
}

/// `directory` and each of its parents, innermost first.
fn ancestors(directory: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = normalize_path(directory);
    loop {
        out.push(current.clone());
        let parent = directory_path(&current);
        if parent.is_empty() || parent == current {
            break;
        }
        current = parent;
    }
    out
}
