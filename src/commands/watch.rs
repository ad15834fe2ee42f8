use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use kiln::application::{
    DiagnosticReporter, ReportDiagnostic, ReportWatchStatus, WatchCompilerHost, WatchDriver, WatchEvent,
    WatchStatusReporter,
};
use kiln::config;
use kiln::domain::entities::{Diagnostic, ExitStatus};
use kiln::domain::value_objects::CompilerOptions;
use kiln::infrastructure::{local_system, EventLoop, FsProgramFactory};

use super::{peek_config, project_source, ProjectSource};
use crate::cli::BuildArgs;
use crate::ui::terminal;

pub fn cmd_watch(args: &BuildArgs, preserve_watch_output: bool, json: bool) -> Result<i32> {
    let cwd = std::env::current_dir().context("cannot read the working directory")?;
    let event_loop = Rc::new(EventLoop::new().context("cannot start the file watcher")?);
    let system = local_system()
        .with_watch_file(event_loop.clone())
        .with_watch_directory(event_loop.clone())
        .with_timers(event_loop.clone());

    let mut options = args.compiler_options();
    options.preserve_watch_output |= preserve_watch_output;

    let source = project_source(args.project.as_deref(), &args.files, &cwd);
    let peeked = peek_config(&source, &cwd);
    let pretty = options
        .pretty
        .or(peeked.compiler.pretty)
        .unwrap_or_else(terminal::default_pretty);
    options.pretty = Some(pretty);

    let report_diagnostic: Rc<dyn ReportDiagnostic>;
    let report_status: Rc<dyn ReportWatchStatus>;
    if json {
        report_diagnostic =
            Rc::new(|diagnostic: &Diagnostic| println!("{}", WatchEvent::diagnostic(diagnostic).to_json()));
        report_status = Rc::new(|diagnostic: &Diagnostic, _: &str, _: &CompilerOptions| {
            println!("{}", WatchEvent::status(diagnostic).to_json());
            false
        });
    } else {
        report_diagnostic = Rc::new(DiagnosticReporter::new(&system, pretty));
        report_status = Rc::new(
            WatchStatusReporter::new(&system, pretty)
                .with_screen_starting_codes(peeked.watch.screen_starting_codes.clone()),
        );
    }

    let factory = Rc::new(FsProgramFactory);
    let host = match source {
        ProjectSource::ConfigFile(name) => WatchCompilerHost::of_config_file(
            name,
            options,
            &system,
            factory,
            Some(report_diagnostic),
            Some(report_status),
        ),
        ProjectSource::RootFiles(files) => WatchCompilerHost::of_root_files(
            files,
            config::load_user_or_default(),
            options,
            &system,
            factory,
            Some(report_diagnostic),
            Some(report_status),
        ),
    };

    let mut driver = WatchDriver::new(host);
    if json {
        driver = driver.with_observer(Rc::new(|event: &WatchEvent| println!("{}", event.to_json())));
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("cannot install the Ctrl+C handler")?;

    if driver.start().is_err() {
        return Ok(ExitStatus::DiagnosticsPresentOutputsSkipped.code());
    }
    event_loop.run(&running, || driver.fatal().is_some())?;
    driver.close();

    if driver.fatal().is_some() {
        return Ok(ExitStatus::DiagnosticsPresentOutputsSkipped.code());
    }
    Ok(ExitStatus::Success.code())
}
