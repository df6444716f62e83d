pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "asha",
    about = "Asha operator CLI",
    long_about = "Operate Asha runtime readiness: migrations, knowledge seeding and scraping, \
                  config inspection, and health diagnostics.",
    after_help = "Examples:\n  asha doctor --json\n  asha migrate\n  asha seed\n  asha scrape"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Write the bundled sample knowledge files into the data directory")]
    Seed,
    #[command(about = "Run a one-shot scrape and merge of job and event listings")]
    Scrape,
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
    #[command(about = "Validate config, database connectivity, and knowledge directory checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Scrape => commands::scrape::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
