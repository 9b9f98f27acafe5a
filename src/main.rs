mod api;
mod cli;
mod dates;
mod error;
mod filters;
mod fmt;
mod models;
mod reports;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "upbank=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = cli.settings().and_then(|settings| match &cli.command {
        Commands::Accounts(args) => cli::accounts::run(&settings, args),
        Commands::Transactions(args) => cli::transactions::run(&settings, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
