use std::process::ExitCode;

fn main() -> ExitCode {
    asha_cli::run()
}
