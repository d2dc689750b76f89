use clap::{Arg, ArgMatches, Command};
use serde::Serialize;
use soascape::{EndpointResolver, RunLog};

use crate::commands::{self, CommandResult};
use crate::error::CliError;

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedEndpoint {
    pub name: String,
    pub registry_folder: String,
    pub protected: String,
}

pub fn command() -> Command {
    let command = Command::new("endpoints")
        .about("Resolve protected endpoints without writing reports")
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("PATH")
                .required(true)
                .help("Catalog snapshot document (JSON)."),
        );
    commands::with_resolver_args(command)
}

pub fn run(matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let catalog = commands::load_catalog(
        matches.get_one::<String>("catalog").expect("clap ensures required option"),
    )?;

    let (settings, alternate_host) = commands::resolver_settings(matches);
    let mut resolver = EndpointResolver::new(settings, alternate_host);
    let mut log = RunLog::disabled();

    let mut entries = Vec::new();
    for (_, endpoint) in catalog.all_endpoints() {
        let protected = resolver.resolve(&endpoint.registry_folder_url, &mut log);
        entries.push(ResolvedEndpoint {
            name: endpoint.name.clone(),
            registry_folder: endpoint.registry_folder_url.clone(),
            protected,
        });
    }

    Ok(CommandResult::Endpoints {
        entries,
        unresolved: log.entries(),
    })
}
