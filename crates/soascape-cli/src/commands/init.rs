use std::fs;
use std::path::Path;

use clap::{Arg, ArgMatches, Command};

use crate::commands::CommandResult;
use crate::error::CliError;

pub fn command() -> Command {
    Command::new("init")
        .about("Create the output tree for reporting runs")
        .arg(
            Arg::new("root")
                .value_name("PATH")
                .required(true)
                .help("Output root; log/, reports/ and xsl/ are created underneath."),
        )
}

pub fn run(matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let root = matches.get_one::<String>("root").expect("clap ensures required option");
    let root_path = Path::new(root);

    let mut created = Vec::new();
    for relative in [
        "log",
        "reports/public/xml",
        "reports/special/xml",
        "reports/private",
        "xsl",
    ] {
        let dir = root_path.join(relative);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
            created.push(relative.to_string());
        }
    }

    Ok(CommandResult::Initialized {
        root: root.clone(),
        created,
    })
}
