use clap::{Arg, ArgAction, ArgMatches, Command};
use soascape::{HandlebarsStylesheetEngine, ReportOrchestrator, RunConfig};

use crate::commands::{self, CommandResult};
use crate::error::CliError;

pub fn command() -> Command {
    let command = Command::new("generate")
        .about("Write the full report family for a catalog snapshot")
        .arg(
            Arg::new("output-root")
                .long("output-root")
                .value_name("PATH")
                .required(true)
                .help("Existing output root prepared with `soascape init`."),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("PATH")
                .required(true)
                .help("Catalog snapshot document (JSON)."),
        )
        .arg(
            Arg::new("translations")
                .long("translations")
                .value_name("PATH")
                .help("Translation document of (From, To) pairs for HTML file names."),
        )
        .arg(
            Arg::new("skip-endpoints")
                .long("skip-endpoints")
                .action(ArgAction::SetTrue)
                .help("Skip the protected-endpoint resolution pass."),
        )
        .arg(
            Arg::new("date-suffix")
                .long("date-suffix")
                .action(ArgAction::SetTrue)
                .help("Append the run date to special and private XML file names."),
        );
    commands::with_resolver_args(command)
}

pub fn run(matches: &ArgMatches, verbose: bool) -> Result<CommandResult, CliError> {
    let root = matches
        .get_one::<String>("output-root")
        .expect("clap ensures required option");
    let catalog = commands::load_catalog(
        matches.get_one::<String>("catalog").expect("clap ensures required option"),
    )?;

    let (resolver, alternate_host) = commands::resolver_settings(matches);
    let mut config = RunConfig::new(root);
    config.translations_file = matches.get_one::<String>("translations").map(Into::into);
    config.resolve_endpoints = !matches.get_flag("skip-endpoints");
    config.date_suffix = matches.get_flag("date-suffix");
    config.alternate_host = alternate_host;
    config.resolver = resolver;

    if verbose {
        tracing::info!(
            output_root = %root,
            resolve_endpoints = config.resolve_endpoints,
            "starting reporting run"
        );
    }

    let mut orchestrator = ReportOrchestrator::new(config, HandlebarsStylesheetEngine::new());
    let summary = orchestrator.run(&catalog)?;

    Ok(CommandResult::Generated {
        root: root.clone(),
        reports_written: summary.reports_written,
        failures: summary.failures,
        resolved_endpoints: summary.resolved_endpoints,
        log: summary
            .log_path
            .map(|path| path.to_string_lossy().into_owned()),
    })
}
