//! Kiln CLI - compiler driver with a watch mode
//!
//! Usage: kiln <COMMAND>
//!
//! Commands:
//!   build    Build the project once
//!   watch    Build, then rebuild whenever an input changes
//!   explain  List the files of the build and why each one is included

use clap::Parser;

mod cli;
mod commands;
mod ui;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => commands::build::cmd_build(&args),
        Commands::Watch {
            build,
            preserve_watch_output,
            json,
        } => commands::watch::cmd_watch(&build, preserve_watch_output, json),
        Commands::Explain { project, files } => commands::explain::cmd_explain(project, files),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// `-v` info, `-vv` debug, `-vvv` trace; `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
