use std::path::PathBuf;

use anyhow::Result;

use crate::cli::BuildArgs;

/// `build --list-files-only --explain-files`
pub fn cmd_explain(project: Option<PathBuf>, files: Vec<String>) -> Result<i32> {
    let args = BuildArgs {
        project,
        files,
        list_files_only: true,
        explain_files: true,
        ..Default::default()
    };
    super::build::cmd_build(&args)
}
