pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "quotebook",
    about = "Quotebook operator CLI",
    long_about = "Apply migrations, seed example quotes, inspect configuration, and check readiness.",
    after_help = "Examples:\n  quotebook migrate\n  quotebook seed\n  quotebook doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Apply migrations, then insert the example quotes if the store is empty")]
    Seed,
    #[command(about = "Print the effective configuration with the source of each value")]
    Config,
    #[command(about = "Check config, database connectivity, schema presence, and quote count")]
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
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
