use std::fs;

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use soascape::{CatalogSnapshot, CredentialConfig, HttpSettings, ResolverSettings};

use crate::error::{CliError, ExitStatus};

pub mod endpoints;
pub mod generate;
pub mod init;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    Initialized {
        root: String,
        created: Vec<String>,
    },
    Generated {
        root: String,
        reports_written: usize,
        failures: usize,
        resolved_endpoints: usize,
        log: Option<String>,
    },
    Endpoints {
        entries: Vec<endpoints::ResolvedEndpoint>,
        unresolved: usize,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        // Partial report failures do not fail the run; callers consult the
        // log for detail.
        ExitStatus::Ok
    }
}

pub(crate) fn load_catalog(path: &str) -> Result<CatalogSnapshot, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|err| CliError::new(format!("catalog {path}: {err}"), ExitStatus::Usage))?;
    CatalogSnapshot::from_json(&text)
        .map_err(|err| CliError::new(format!("catalog {path}: {err}"), ExitStatus::Data))
}

/// Resolver flags shared by `generate` and `endpoints`.
pub(crate) fn with_resolver_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("http")
                .long("http")
                .action(ArgAction::SetTrue)
                .help("Fetch endpoint descriptors from the registry over HTTP instead of a filesystem mirror."),
        )
        .arg(
            Arg::new("virtual-root")
                .long("virtual-root")
                .value_name("PATH")
                .help("Physical root for registry folder URLs in filesystem mode (hosted layout)."),
        )
        .arg(
            Arg::new("alternate-host")
                .long("alternate-host")
                .value_name("URL")
                .help("Override the host and leading path segments of registry folder URLs."),
        )
        .arg(
            Arg::new("insecure-skip-verify")
                .long("insecure-skip-verify")
                .action(ArgAction::SetTrue)
                .help("Skip TLS certificate validation for registry fetches."),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .value_name("USER")
                .help("User id for basic registry authentication; ambient identity applies when omitted."),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .value_name("PASSWORD")
                .help("Password for basic registry authentication."),
        )
        .arg(
            Arg::new("auth-domain")
                .long("auth-domain")
                .value_name("DOMAIN")
                .help("Account domain for basic registry authentication."),
        )
}

pub(crate) fn resolver_settings(matches: &ArgMatches) -> (ResolverSettings, Option<String>) {
    let alternate_host = matches.get_one::<String>("alternate-host").cloned();

    let settings = if matches.get_flag("http") {
        let credentials = match matches.get_one::<String>("user") {
            Some(user) => CredentialConfig::Basic {
                user: user.clone(),
                password: matches
                    .get_one::<String>("password")
                    .cloned()
                    .unwrap_or_default(),
                domain: matches
                    .get_one::<String>("auth-domain")
                    .cloned()
                    .unwrap_or_default(),
            },
            None => CredentialConfig::Ambient,
        };
        ResolverSettings::Http(HttpSettings {
            insecure_skip_verify: matches.get_flag("insecure-skip-verify"),
            credentials,
        })
    } else {
        ResolverSettings::FileSystem {
            virtual_root: matches.get_one::<String>("virtual-root").map(Into::into),
        }
    };

    (settings, alternate_host)
}
