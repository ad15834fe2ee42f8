use anyhow::{Context, Result};
use kiln::application::{
    parse_command_line, parse_config_file_with_system, perform_compilation, DiagnosticReporter,
};
use kiln::config;
use kiln::domain::entities::ExitStatus;
use kiln::infrastructure::{local_system, FsProgramFactory};
use kiln::KilnError;

use super::{project_source, ProjectSource};
use crate::cli::BuildArgs;
use crate::ui::terminal;

pub fn cmd_build(args: &BuildArgs) -> Result<i32> {
    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    let system = local_system();
    let options = args.compiler_options();
    let default_pretty = terminal::default_pretty();

    let source = project_source(args.project.as_deref(), &args.files, &cwd);
    log::debug!("build input: {source:?}");
    let mut parsed = match source {
        ProjectSource::ConfigFile(name) => {
            let reporter = DiagnosticReporter::new(&system, options.pretty.unwrap_or(default_pretty));
            match parse_config_file_with_system(&name, &options, &system, &reporter).into_result() {
                Ok(parsed) => parsed,
                Err(KilnError::Unrecoverable { code, .. }) => {
                    log::debug!("stopping on config error KL{code}");
                    return Ok(ExitStatus::DiagnosticsPresentOutputsSkipped.code());
                }
                Err(e) => return Err(e.into()),
            }
        }
        ProjectSource::RootFiles(files) => {
            parse_command_line(&files, config::load_user_or_default(), &options, &system)
        }
    };

    let pretty = *parsed.options.pretty.get_or_insert(default_pretty);
    let reporter = DiagnosticReporter::new(&system, pretty);
    Ok(perform_compilation(&parsed, &system, &FsProgramFactory, &reporter).code())
}
