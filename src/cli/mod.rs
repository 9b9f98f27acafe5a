pub mod accounts;
pub mod transactions;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "upbank",
    version,
    about = "List Up Bank accounts and transactions with totals.",
    long_about = "List Up Bank accounts and transactions with totals.\n\n\
                  Reads the API token from the UPBANK_API_KEY environment variable."
)]
pub struct Cli {
    /// Override the API base URL from settings.json
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Log each request to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings file values with command-line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = load_settings()?;
        if let Some(url) = &self.base_url {
            settings.base_url = url.clone();
        }
        Ok(settings)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all accounts with their balances.
    Accounts(AccountsArgs),
    /// List transactions with debit, credit and net totals.
    Transactions(TransactionsArgs),
}

#[derive(Args, Debug, Default)]
pub struct AccountsArgs {
    /// Filter accounts by type (e.g. SAVER, TRANSACTIONAL)
    #[arg(long = "type")]
    pub account_type: Option<String>,
    /// Filter accounts by ownership type (e.g. INDIVIDUAL, JOINT)
    #[arg(long)]
    pub ownership: Option<String>,
    /// Display raw values without pretty formatting
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug, Default)]
pub struct TransactionsArgs {
    /// Filter by status (HELD, SETTLED)
    #[arg(long)]
    pub status: Option<String>,
    /// Only transactions from this date/time: YYYY-MM-DD (local midnight) or RFC3339
    #[arg(long)]
    pub since: Option<String>,
    /// Only transactions before this date/time: YYYY-MM-DD (local midnight) or RFC3339
    #[arg(long)]
    pub until: Option<String>,
    /// Filter by category ID
    #[arg(long)]
    pub category: Option<String>,
    /// Filter by tag ID
    #[arg(long)]
    pub tag: Option<String>,
    /// Filter by foreign currency code, e.g. JPY (applied locally)
    #[arg(long)]
    pub currency: Option<String>,
    /// Filter by description, case-insensitive partial match (applied locally)
    #[arg(long)]
    pub description: Option<String>,
    /// Records per page requested from the API
    #[arg(long = "page-size")]
    pub page_size: Option<u32>,
    /// Display raw values without pretty formatting
    #[arg(long)]
    pub raw: bool,
    /// Include message, foreign amount and tags
    #[arg(long)]
    pub detail: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transactions_flags() {
        let cli = Cli::parse_from([
            "upbank",
            "transactions",
            "--since",
            "2024-01-01",
            "--currency",
            "JPY",
            "--detail",
            "--base-url",
            "http://localhost:9999",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9999"));
        match cli.command {
            Commands::Transactions(args) => {
                assert_eq!(args.since.as_deref(), Some("2024-01-01"));
                assert_eq!(args.currency.as_deref(), Some("JPY"));
                assert!(args.detail);
                assert!(!args.raw);
            }
            Commands::Accounts(_) => panic!("expected transactions"),
        }
    }

    #[test]
    fn test_parse_accounts_flags() {
        let cli = Cli::parse_from(["upbank", "-v", "accounts", "--type", "SAVER", "--raw"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Accounts(args) => {
                assert_eq!(args.account_type.as_deref(), Some("SAVER"));
                assert!(args.ownership.is_none());
                assert!(args.raw);
            }
            Commands::Transactions(_) => panic!("expected accounts"),
        }
    }
}
