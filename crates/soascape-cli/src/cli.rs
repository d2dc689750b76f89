use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::commands;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};

const NAME: &str = "soascape";

pub fn run() -> ExitCode {
    init_tracing();
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments and dispatches to the appropriate command, returning
/// a POSIX `sysexits`-compatible `ExitCode` so automation can react
/// deterministically.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let output = if matches.get_flag("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let verbose = matches.get_flag("verbose");

    let result = dispatch(&matches, verbose)?;
    emit_result(result, output)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Defines the root `clap::Command` tree, including global flags and the
/// `init`, `generate`, and `endpoints` subcommands.
fn build_cli() -> Command {
    Command::new(NAME)
        .about("SoaScape catalog reporting")
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Emit newline-delimited JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Emit additional logging about resolved configuration and output paths."),
        )
        .subcommand_required(true)
        .subcommand(commands::init::command())
        .subcommand(commands::generate::command())
        .subcommand(commands::endpoints::command())
}

fn dispatch(matches: &ArgMatches, verbose: bool) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("init", sub)) => commands::init::run(sub),
        Some(("generate", sub)) => commands::generate::run(sub, verbose),
        Some(("endpoints", sub)) => commands::endpoints::run(sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
