//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::NewLineKind;
use crate::error::{KilnError, KilnResult};

use super::types::Config;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "kiln.toml";

/// A key the configuration schema does not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// Dotted path of the key, e.g. `compiler.prety`
    pub path: String,
    pub key: String,
    /// Byte offset of the key in the file, when it can be found
    pub offset: Option<usize>,
    pub suggestion: Option<String>,
}

/// Parse configuration text, collecting unknown keys instead of failing on them.
pub fn parse_with_warnings(content: &str) -> Result<(Config, Vec<UnknownKey>), toml::de::Error> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path| {
            let key = path.split('.').next_back().unwrap_or(path.as_str()).to_string();
            UnknownKey {
                offset: find_key_offset(content, &key),
                suggestion: suggest_key(&key),
                key,
                path,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load a configuration file from disk.
pub fn load_with_warnings(path: &Path) -> KilnResult<(Config, Vec<UnknownKey>)> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => KilnError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => KilnError::Io(e),
    })?;
    parse_with_warnings(&content).map_err(|e| KilnError::ConfigParse {
        file: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

/// `<config_dir>/kiln/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kiln").join("config.toml"))
}

/// User configuration when present and valid, otherwise defaults.
pub fn load_user_or_default() -> Config {
    if let Some(path) = user_config_path() {
        if path.exists() {
            match load_with_warnings(&path) {
                Ok((config, _)) => return config,
                Err(e) => log::warn!("ignoring user config {}: {e}", path.display()),
            }
        }
    }
    Config::default()
}

/// Apply `KILN_*` environment overrides read through `env`.
pub fn with_env_overrides(mut config: Config, env: impl Fn(&str) -> Option<String>) -> Config {
    // KILN_PRETTY
    if let Some(value) = env("KILN_PRETTY") {
        if let Some(flag) = parse_flag(&value) {
            config.compiler.pretty = Some(flag);
        }
    }

    // KILN_PRESERVE_WATCH_OUTPUT
    if let Some(value) = env("KILN_PRESERVE_WATCH_OUTPUT") {
        if let Some(flag) = parse_flag(&value) {
            config.compiler.preserve_watch_output = flag;
        }
    }

    // KILN_NEW_LINE
    if let Some(value) = env("KILN_NEW_LINE") {
        match NewLineKind::parse(&value) {
            Some(kind) => config.compiler.new_line = Some(kind),
            None => log::warn!("ignoring KILN_NEW_LINE={value}: expected lf or crlf"),
        }
    }

    config
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn find_key_offset(content: &str, key: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(key)
            && trimmed[key.len()..].trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "compiler",
        "files",
        "watch",
        "pretty",
        "preserve_watch_output",
        "diagnostics",
        "extended_diagnostics",
        "list_files",
        "list_files_only",
        "explain_files",
        "list_emitted_files",
        "new_line",
        "out_dir",
        "root_dir",
        "no_emit",
        "no_emit_on_error",
        "declaration",
        "emit_declaration_only",
        "emit_bom",
        "charset",
        "types",
        "type_roots",
        "lib",
        "include",
        "extensions",
        "references",
        "debounce_ms",
        "screen_starting_codes",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
