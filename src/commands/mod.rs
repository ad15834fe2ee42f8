//! Command implementations for the kiln binary

pub mod build;
pub mod explain;
pub mod watch;

use std::path::{Path, PathBuf};

use kiln::config::{self, Config, PROJECT_CONFIG_FILE};

/// Where a command reads its build input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    /// A project config file
    ConfigFile(String),
    /// Explicit root files, or the working directory when empty, under the
    /// user config
    RootFiles(Vec<String>),
}

/// `-p` wins; otherwise explicit files; otherwise `kiln.toml` in `cwd` when
/// it exists.
pub fn project_source(project: Option<&Path>, files: &[String], cwd: &Path) -> ProjectSource {
    if let Some(project) = project {
        let path = if cwd.join(project).is_dir() {
            project.join(PROJECT_CONFIG_FILE)
        } else {
            project.to_path_buf()
        };
        return ProjectSource::ConfigFile(path.to_string_lossy().replace('\\', "/"));
    }
    if files.is_empty() && cwd.join(PROJECT_CONFIG_FILE).is_file() {
        return ProjectSource::ConfigFile(PROJECT_CONFIG_FILE.to_string());
    }
    ProjectSource::RootFiles(files.to_vec())
}

/// The project config when it can be read, for settings needed before the
/// session parses it. Problems are left for the parse to report.
pub fn peek_config(source: &ProjectSource, cwd: &Path) -> Config {
    let config = match source {
        ProjectSource::ConfigFile(name) => {
            let path: PathBuf = cwd.join(name);
            match config::load_with_warnings(&path) {
                Ok((config, _)) => config,
                Err(e) => {
                    log::debug!("config not readable yet: {e}");
                    Config::default()
                }
            }
        }
        ProjectSource::RootFiles(_) => config::load_user_or_default(),
    };
    config::with_env_overrides(config, |name| std::env::var(name).ok())
}
