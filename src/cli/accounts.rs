use colored::Colorize;
use comfy_table::{presets, Cell, CellAlignment, Table};
use tracing::debug;

use crate::api::{Client, Transport};
use crate::cli::AccountsArgs;
use crate::error::Result;
use crate::filters::{non_empty, AccountQuery};
use crate::fmt::{created_at, money, plain_money};
use crate::models::Account;
use crate::reports::{account_totals, sort_accounts, AccountTotals};
use crate::settings::Settings;

pub fn run(settings: &Settings, args: &AccountsArgs) -> Result<()> {
    let client = Client::from_env(settings)?;
    let table = list(&client, args)?;
    println!("{table}");
    Ok(())
}

/// Fetch, sort and total accounts, returning the rendered table.
pub fn list<T: Transport>(client: &Client<T>, args: &AccountsArgs) -> Result<Table> {
    let query = AccountQuery {
        account_type: non_empty(args.account_type.clone()),
        ownership_type: non_empty(args.ownership.clone()),
    };
    let mut accounts = client.accounts(&query)?;
    sort_accounts(&mut accounts);
    let totals = account_totals(&accounts)?;
    debug!(count = accounts.len(), "rendering accounts");
    Ok(render(&accounts, &totals, args.raw))
}

pub fn render(accounts: &[Account], totals: &AccountTotals, raw: bool) -> Table {
    let mut table = Table::new();
    if raw {
        table.load_preset(presets::ASCII_MARKDOWN);
        table.set_header(vec!["ID", "Type", "Ownership", "Name", "Balance", "Currency", "Created At"]);
    } else {
        table.set_header(vec!["Type", "Ownership", "Name", "Balance", "Currency", "Created At"]);
    }

    for account in accounts {
        let attrs = &account.attributes;
        let balance = if raw {
            attrs.balance.value.clone()
        } else {
            attrs
                .balance
                .minor_units()
                .map(money)
                .unwrap_or_else(|_| attrs.balance.value.clone())
        };

        let mut row = Vec::with_capacity(7);
        if raw {
            row.push(Cell::new(&account.id));
        }
        row.extend([
            Cell::new(&attrs.account_type),
            Cell::new(&attrs.ownership_type),
            Cell::new(&attrs.display_name),
            Cell::new(balance).set_alignment(CellAlignment::Right),
            Cell::new(&attrs.balance.currency_code),
            Cell::new(created_at(&attrs.created_at, raw)),
        ]);
        table.add_row(row);
    }

    let currency = totals.currency().unwrap_or("MIXED");
    let (label, total) = if raw {
        (Cell::new("Total"), plain_money(totals.balance))
    } else {
        (Cell::new("Total".bold()), money(totals.balance))
    };
    let mut footer = Vec::with_capacity(7);
    if raw {
        footer.push(Cell::new(""));
    }
    footer.extend([
        Cell::new(""),
        Cell::new(""),
        label,
        Cell::new(total).set_alignment(CellAlignment::Right),
        Cell::new(currency),
        Cell::new(""),
    ]);
    table.add_row(footer);
    table
}
