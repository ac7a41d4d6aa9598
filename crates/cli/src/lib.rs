pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::customers::CustomerAction;

#[derive(Debug, Parser)]
#[command(
    name = "clientele",
    about = "Clientele operator CLI",
    long_about = concat!(
        "Apply migrations, inspect configuration and readiness, ",
        "and manage customer records through the HTTP API."
    ),
    after_help = concat!(
        "Examples:\n",
        "  clientele doctor --json\n",
        "  clientele customers create --first-name Ada --last-name Lovelace",
        " --email ada@example.com\n",
        "  clientele customers get 3f2b0c1e-5d1a-4f4e-9a57-1c2d3e4f5a6b"
    )
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and API reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Create, read, update, and delete customers via the API")]
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Customers { action } => commands::customers::run(action),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
