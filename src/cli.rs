use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use kiln::domain::value_objects::CompilerOptions;

/// Kiln - compiler driver with a watch mode
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the project once
    Build(BuildArgs),

    /// Build, then rebuild whenever an input changes
    Watch {
        #[command(flatten)]
        build: BuildArgs,

        /// Never clear the screen between builds
        #[arg(long)]
        preserve_watch_output: bool,

        /// Print session events as NDJSON instead of status lines
        #[arg(long)]
        json: bool,
    },

    /// List the files of the build and why each one is included
    Explain {
        /// Path to kiln.toml, or a directory containing one
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Root files to use instead of a project
        files: Vec<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Path to kiln.toml, or a directory containing one
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Root files to compile instead of a project
    pub files: Vec<String>,

    /// Colored output with source context
    #[arg(long, overrides_with = "no_pretty")]
    pub pretty: bool,

    /// Plain one-line diagnostics
    #[arg(long)]
    pub no_pretty: bool,

    /// Print every file of the build
    #[arg(long)]
    pub list_files: bool,

    /// Print every file of the build, then stop without checking or emitting
    #[arg(long)]
    pub list_files_only: bool,

    /// Print why each file is part of the build
    #[arg(long)]
    pub explain_files: bool,

    /// Print the name of every file written
    #[arg(long)]
    pub list_emitted_files: bool,

    /// Print I/O timings
    #[arg(long)]
    pub diagnostics: bool,

    /// Print I/O timings and keep watch output
    #[arg(long)]
    pub extended_diagnostics: bool,

    /// Output directory
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Check only, write nothing
    #[arg(long)]
    pub no_emit: bool,

    /// Also write declaration files
    #[arg(long)]
    pub declaration: bool,
}

impl BuildArgs {
    /// Options given on the command line; they win over every config layer.
    pub fn compiler_options(&self) -> CompilerOptions {
        let pretty = match (self.pretty, self.no_pretty) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        CompilerOptions {
            pretty,
            list_files: self.list_files,
            list_files_only: self.list_files_only,
            explain_files: self.explain_files,
            list_emitted_files: self.list_emitted_files,
            diagnostics: self.diagnostics,
            extended_diagnostics: self.extended_diagnostics,
            out_dir: self.out_dir.clone(),
            no_emit: self.no_emit,
            declaration: self.declaration,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build() {
        let cli = Cli::try_parse_from(["kiln", "build"]).unwrap();
        assert!(matches!(cli.command, Commands::Build(_)));
    }

    #[test]
    fn test_cli_parse_build_with_args() {
        let cli = Cli::try_parse_from([
            "kiln",
            "build",
            "-p",
            "app/kiln.toml",
            "--list-files",
            "--out-dir",
            "dist",
            "--no-pretty",
        ])
        .unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("Expected Build command");
        };
        assert_eq!(args.project, Some(PathBuf::from("app/kiln.toml")));
        let options = args.compiler_options();
        assert!(options.list_files);
        assert_eq!(options.out_dir.as_deref(), Some("dist"));
        assert_eq!(options.pretty, Some(false));
    }

    #[test]
    fn test_cli_pretty_unset_by_default() {
        let cli = Cli::try_parse_from(["kiln", "build", "a.ts", "b.ts"]).unwrap();
        let Commands::Build(args) = cli.command else {
            panic!("Expected Build command");
        };
        assert_eq!(args.files, vec!["a.ts", "b.ts"]);
        assert_eq!(args.compiler_options().pretty, None);
    }

    #[test]
    fn test_cli_parse_watch() {
        let cli = Cli::try_parse_from(["kiln", "watch", "--json", "--preserve-watch-output", "--pretty"]).unwrap();
        let Commands::Watch {
            build,
            preserve_watch_output,
            json,
        } = cli.command
        else {
            panic!("Expected Watch command");
        };
        assert!(json);
        assert!(preserve_watch_output);
        assert_eq!(build.compiler_options().pretty, Some(true));
    }

    #[test]
    fn test_cli_parse_explain() {
        let cli = Cli::try_parse_from(["kiln", "explain", "--project", "lib"]).unwrap();
        if let Commands::Explain { project, files } = cli.command {
            assert_eq!(project, Some(PathBuf::from("lib")));
            assert!(files.is_empty());
        } else {
            panic!("Expected Explain command");
        }
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["kiln", "-vvv", "build"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }
}
