mod cli;
mod commands;
mod error;
mod formatter;

pub use cli::{run, run_cli};
pub use error::CliError;
