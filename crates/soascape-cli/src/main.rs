use std::process::ExitCode;

fn main() -> ExitCode {
    soascape_cli::run()
}
