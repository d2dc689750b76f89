use std::process::ExitCode;

use crate::commands::CommandResult;
use crate::error::{CliError, ExitStatus};

pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a `CommandResult` as either human-readable text or
/// newline-delimited JSON, converting outcomes into deterministic exit
/// codes.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::Initialized { root, created } => {
            if created.is_empty() {
                println!("Output tree already initialized at {root}");
            } else {
                println!("Initialized output tree at {root}");
                for dir in created {
                    println!("  + {dir}");
                }
            }
        }
        CommandResult::Generated {
            root,
            reports_written,
            failures,
            resolved_endpoints,
            log,
        } => {
            if *failures == 0 {
                println!("Generated {reports_written} reports under {root}");
            } else {
                println!(
                    "Generated {reports_written} reports under {root} ({failures} failed)"
                );
            }
            println!("  resolved endpoints: {resolved_endpoints}");
            if let Some(log) = log {
                println!("  run log: {log}");
            }
        }
        CommandResult::Endpoints {
            entries,
            unresolved,
        } => {
            println!("Resolved endpoints ({}):", entries.len());
            for entry in entries {
                if entry.protected.is_empty() {
                    println!("  - {} (unresolved)", entry.name);
                } else {
                    println!("  - {} -> {}", entry.name, entry.protected);
                }
            }
            if *unresolved > 0 {
                println!("  {unresolved} resolution failures");
            }
        }
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let line = serde_json::to_string(result)
        .map_err(|err| CliError::new(err.to_string(), ExitStatus::Software))?;
    println!("{line}");
    Ok(())
}
