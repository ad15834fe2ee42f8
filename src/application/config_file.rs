//! Config file parsing
//!
//! Turns `kiln.toml` into the input of a program build: options layered with
//! environment and command-line overrides, the expanded root file list,
//! referenced projects, and the diagnostics found while parsing.

use std::rc::Rc;

use crate::application::compiler_host::ProgramHost;
use crate::application::reporter::ReportDiagnostic;
use crate::config::{self, Config, FilesConfig, WatchConfig, PROJECT_CONFIG_FILE};
use crate::domain::entities::{Diagnostic, SourceFile};
use crate::domain::ports::{ProgramInput, ProjectReference, System};
use crate::domain::value_objects::path::{combine_paths, directory_path, normalized_absolute_path};
use crate::domain::value_objects::{messages, CompilerOptions, FileNameCasing};
use crate::error::KilnResult;

/// A fully resolved build request.
#[derive(Debug, Clone, Default)]
pub struct ParsedCommandLine {
    pub config_file_name: Option<String>,
    pub options: CompilerOptions,
    pub file_names: Vec<String>,
    pub project_references: Vec<ProjectReference>,
    /// Config-file parsing diagnostics
    pub errors: Vec<Diagnostic>,
    pub watch: WatchConfig,
    /// Absolute directories whose contents feed `file_names`
    pub wildcard_directories: Vec<String>,
    /// Extensions picked up from `wildcard_directories`
    pub extensions: Vec<String>,
    /// Absolute output directory, never read as input
    pub out_directory: Option<String>,
}

impl ParsedCommandLine {
    pub fn program_input(&self) -> ProgramInput {
        ProgramInput {
            root_names: self.file_names.clone(),
            options: self.options.clone(),
            config_file_parsing_diagnostics: self.errors.clone(),
            project_references: self.project_references.clone(),
        }
    }

    /// Whether `file_name` would be picked up by a wildcard directory.
    pub fn matches_wildcard(&self, file_name: &str) -> bool {
        let has_extension = self
            .extensions
            .iter()
            .any(|extension| file_name.ends_with(&format!(".{extension}")));
        has_extension
            && !is_excluded(file_name, self.out_directory.as_deref())
            && self.wildcard_directories.iter().any(|directory| {
                file_name
                    .strip_prefix(directory.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

/// Result of reading a config file.
#[derive(Debug, Clone)]
pub enum ConfigParseOutcome {
    Parsed(ParsedCommandLine),
    /// The file could not be used at all; the diagnostic was already reported
    Unrecoverable(Diagnostic),
}

impl ConfigParseOutcome {
    pub fn into_result(self) -> KilnResult<ParsedCommandLine> {
        match self {
            ConfigParseOutcome::Parsed(parsed) => Ok(parsed),
            ConfigParseOutcome::Unrecoverable(diagnostic) => Err((&diagnostic).into()),
        }
    }
}

/// Read and parse `config_file_name`, layering `options_to_extend` on top.
///
/// A missing, unreadable or malformed file is unrecoverable: its diagnostic
/// goes to `report` and the caller is expected to stop.
pub fn parse_config_file_with_system(
    config_file_name: &str,
    options_to_extend: &CompilerOptions,
    system: &System,
    report: &dyn ReportDiagnostic,
) -> ConfigParseOutcome {
    let host = ProgramHost::new(system.clone()).without_trace();
    let path = normalized_absolute_path(config_file_name, host.current_directory());
    log::debug!("reading config file {path}");

    let (config, errors) = match read_config(&host, &path) {
        Ok(parsed) => parsed,
        Err(diagnostic) => {
            report.report(&diagnostic);
            return ConfigParseOutcome::Unrecoverable(diagnostic);
        }
    };

    let config = config::with_env_overrides(config, |name| host.get_environment_variable(name));
    ConfigParseOutcome::Parsed(resolve(
        config,
        &directory_path(&path),
        Some(path.clone()),
        options_to_extend,
        &host,
        errors,
    ))
}

/// Build a command line without a project config file.
///
/// `root_names` wins over the `[files]` selection of `config` when non-empty.
pub fn parse_command_line(
    root_names: &[String],
    config: Config,
    options_to_extend: &CompilerOptions,
    system: &System,
) -> ParsedCommandLine {
    let host = ProgramHost::new(system.clone()).without_trace();
    let config = config::with_env_overrides(config, |name| host.get_environment_variable(name));
    let base_directory = host.current_directory().to_string();
    if root_names.is_empty() {
        return resolve(config, &base_directory, None, options_to_extend, &host, Vec::new());
    }

    let mut options = config.compiler;
    options.extend(options_to_extend);
    resolve_option_paths(&mut options, &base_directory);
    ParsedCommandLine {
        config_file_name: None,
        out_directory: options.out_dir.clone(),
        options,
        file_names: root_names
            .iter()
            .map(|name| normalized_absolute_path(name, &base_directory))
            .collect(),
        watch: config.watch,
        ..Default::default()
    }
}

/// Make the path-valued options absolute against `base_directory`.
fn resolve_option_paths(options: &mut CompilerOptions, base_directory: &str) {
    let absolute = |dir: &String| normalized_absolute_path(dir, base_directory);
    options.out_dir = options.out_dir.as_ref().map(absolute);
    options.root_dir = options.root_dir.as_ref().map(absolute);
    options.type_roots = options
        .type_roots
        .as_ref()
        .map(|roots| roots.iter().map(absolute).collect());
}

fn read_config(host: &ProgramHost, path: &str) -> Result<(Config, Vec<Diagnostic>), Diagnostic> {
    let text = match host.read_file(path, None) {
        Ok(Some(text)) => text,
        Ok(None) => return Err(Diagnostic::from_message(&messages::FILE_NOT_FOUND, &[path])),
        Err(e) => {
            return Err(Diagnostic::from_message(
                &messages::CANNOT_READ_FILE,
                &[path, &e.to_string()],
            ))
        }
    };

    let file = Rc::new(SourceFile::new(path, path, text));
    let (config, unknown) = config::parse_with_warnings(file.text()).map_err(|e| {
        let diagnostic = Diagnostic::from_message(&messages::FAILED_TO_PARSE_FILE, &[path, e.message()]);
        match e.span() {
            Some(span) => diagnostic.with_location(&file, span.start, span.len()),
            None => diagnostic,
        }
    })?;

    let warnings = unknown
        .iter()
        .map(|key| {
            let diagnostic = match &key.suggestion {
                Some(suggestion) => Diagnostic::from_message(
                    &messages::UNKNOWN_CONFIG_OPTION_DID_YOU_MEAN,
                    &[key.path.as_str(), suggestion.as_str()],
                ),
                None => Diagnostic::from_message(&messages::UNKNOWN_CONFIG_OPTION, &[key.path.as_str()]),
            };
            match key.offset {
                Some(offset) => diagnostic.with_location(&file, offset, key.key.len()),
                None => diagnostic,
            }
        })
        .collect();
    Ok((config, warnings))
}

fn resolve(
    config: Config,
    base_directory: &str,
    config_file_name: Option<String>,
    options_to_extend: &CompilerOptions,
    host: &ProgramHost,
    mut errors: Vec<Diagnostic>,
) -> ParsedCommandLine {
    let mut options = config.compiler;
    options.extend(options_to_extend);

    resolve_option_paths(&mut options, base_directory);
    let out_dir = options.out_dir.clone();
    let (file_names, wildcard_directories) =
        expand_file_names(&config.files, base_directory, out_dir.as_deref(), host);

    if file_names.is_empty() {
        if let Some(name) = &config_file_name {
            errors.push(Diagnostic::from_message(&messages::NO_INPUTS_FOUND, &[name.as_str()]));
        }
    }

    let project_references = config
        .files
        .references
        .iter()
        .filter_map(|reference| {
            let path = normalized_absolute_path(reference, base_directory);
            let path = if path.ends_with(".toml") {
                path
            } else {
                combine_paths(&path, PROJECT_CONFIG_FILE)
            };
            match resolve_reference(&path, host) {
                Ok(reference) => Some(reference),
                Err(diagnostic) => {
                    errors.push(diagnostic);
                    None
                }
            }
        })
        .collect();

    ParsedCommandLine {
        config_file_name,
        options,
        file_names,
        project_references,
        errors,
        watch: config.watch,
        wildcard_directories,
        extensions: config.files.extensions,
        out_directory: out_dir,
    }
}

fn resolve_reference(path: &str, host: &ProgramHost) -> Result<ProjectReference, Diagnostic> {
    let (config, _) = read_config(host, path)?;
    let base_directory = directory_path(path);
    let out_dir = config
        .compiler
        .out_dir
        .as_deref()
        .map(|dir| normalized_absolute_path(dir, &base_directory));
    let (root_names, _) = expand_file_names(&config.files, &base_directory, out_dir.as_deref(), host);
    Ok(ProjectReference {
        config: path.to_string(),
        root_names,
        out_dir,
    })
}

/// Explicit files first, then the sorted contents of each include directory.
fn expand_file_names(
    files: &FilesConfig,
    base_directory: &str,
    out_dir: Option<&str>,
    host: &ProgramHost,
) -> (Vec<String>, Vec<String>) {
    let casing = FileNameCasing::new(host.use_case_sensitive_file_names());
    let mut seen = std::collections::HashSet::new();
    let mut file_names = Vec::new();

    for file in &files.files {
        let name = normalized_absolute_path(file, base_directory);
        if seen.insert(casing.canonicalize(&name)) {
            file_names.push(name);
        }
    }

    let directories: Vec<String> = files
        .include_directories()
        .iter()
        .map(|dir| normalized_absolute_path(dir, base_directory))
        .collect();
    for directory in &directories {
        let mut found: Vec<String> = host
            .read_directory(directory, &files.extensions)
            .into_iter()
            .map(|name| normalized_absolute_path(&name, directory))
            .filter(|name| !is_excluded(name, out_dir))
            .collect();
        found.sort();
        for name in found {
            if seen.insert(casing.canonicalize(&name)) {
                file_names.push(name);
            }
        }
    }

    (file_names, directories)
}

fn is_excluded(file_name: &str, out_dir: Option<&str>) -> bool {
    file_name.contains("/node_modules/")
        || out_dir.is_some_and(|dir| {
            file_name
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'))
        })
}
