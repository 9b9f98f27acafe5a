use colored::Colorize;
use comfy_table::{presets, Cell, CellAlignment, Table};
use tracing::debug;

use crate::api::{Client, Transport};
use crate::cli::TransactionsArgs;
use crate::error::Result;
use crate::filters::{non_empty, parse_date_flag, ClientFilter, TransactionQuery};
use crate::fmt::{money, plain_money, timestamp};
use crate::models::{MoneyObject, Transaction};
use crate::reports::{sort_transactions, transaction_totals, TransactionTotals};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Summary,
    Detail,
    Raw,
}

impl View {
    pub fn from_flags(raw: bool, detail: bool) -> Self {
        if raw {
            Self::Raw
        } else if detail {
            Self::Detail
        } else {
            Self::Summary
        }
    }

    fn header(self) -> Vec<&'static str> {
        match self {
            Self::Raw => vec![
                "ID",
                "Date",
                "Description",
                "Message",
                "Amount",
                "Currency",
                "Foreign Amount",
                "Foreign Currency",
                "Status",
                "Category",
                "Tags",
                "Settled At",
            ],
            Self::Detail => vec![
                "Date",
                "Description",
                "Message",
                "Amount",
                "Currency",
                "Foreign Amount",
                "Foreign Currency",
                "Category",
                "Tags",
            ],
            Self::Summary => vec!["Date", "Description", "Amount", "Currency", "Category"],
        }
    }

    /// Columns used by the totals rows: (label, amount, currency).
    fn total_columns(self) -> (usize, usize, usize) {
        match self {
            Self::Raw => (2, 4, 5),
            Self::Detail => (1, 3, 4),
            Self::Summary => (1, 2, 3),
        }
    }

    fn money(self, amount: &MoneyObject) -> String {
        if self == Self::Raw {
            return amount.value.clone();
        }
        amount
            .minor_units()
            .map(money)
            .unwrap_or_else(|_| amount.value.clone())
    }
}

pub fn run(settings: &Settings, args: &TransactionsArgs) -> Result<()> {
    // Bad dates fail before the credential is even looked up.
    let query = build_query(settings, args)?;
    let client = Client::from_env(settings)?;
    let table = list(&client, &query, args)?;
    println!("{table}");
    Ok(())
}

pub fn build_query(settings: &Settings, args: &TransactionsArgs) -> Result<TransactionQuery> {
    Ok(TransactionQuery {
        status: non_empty(args.status.clone()),
        since: parse_date_flag("since", args.since.as_deref())?,
        until: parse_date_flag("until", args.until.as_deref())?,
        category: non_empty(args.category.clone()),
        tag: non_empty(args.tag.clone()),
        page_size: args.page_size.or(settings.page_size),
    })
}

pub fn client_filter(args: &TransactionsArgs) -> ClientFilter {
    ClientFilter {
        currency: non_empty(args.currency.clone()),
        description: non_empty(args.description.clone()),
    }
}

/// Fetch, filter, sort and total transactions, returning the rendered table.
pub fn list<T: Transport>(client: &Client<T>, query: &TransactionQuery, args: &TransactionsArgs) -> Result<Table> {
    let fetched = client.transactions(query)?;
    let fetched_count = fetched.len();
    let mut transactions = client_filter(args).apply(fetched);
    debug!(fetched = fetched_count, kept = transactions.len(), "applied local filters");

    sort_transactions(&mut transactions);
    let totals = transaction_totals(&transactions)?;
    Ok(render(&transactions, &totals, View::from_flags(args.raw, args.detail)))
}

pub fn render(transactions: &[Transaction], totals: &TransactionTotals, view: View) -> Table {
    let mut table = Table::new();
    if view == View::Raw {
        table.load_preset(presets::ASCII_MARKDOWN);
    }
    table.set_header(view.header());

    for tx in transactions {
        table.add_row(row(tx, view));
    }

    let currency = totals.currency().unwrap_or("MIXED");
    let format_total = |units: i64| {
        if view == View::Raw {
            plain_money(units)
        } else {
            money(units)
        }
    };
    let labels = if view == View::Raw {
        ["Debits".normal(), "Credits".normal(), "Net".normal()]
    } else {
        ["Debits".red().bold(), "Credits".green().bold(), "Net".bold()]
    };
    let (label_col, amount_col, currency_col) = view.total_columns();
    for (label, units) in labels.into_iter().zip([totals.debit, totals.credit, totals.net()]) {
        let mut cells: Vec<Cell> = view.header().iter().map(|_| Cell::new("")).collect();
        cells[label_col] = Cell::new(label);
        cells[amount_col] = Cell::new(format_total(units)).set_alignment(CellAlignment::Right);
        cells[currency_col] = Cell::new(currency);
        table.add_row(cells);
    }
    table
}

fn row(tx: &Transaction, view: View) -> Vec<Cell> {
    let attrs = &tx.attributes;
    let date = timestamp(&attrs.created_at, view == View::Raw);
    let amount = Cell::new(view.money(&attrs.amount)).set_alignment(CellAlignment::Right);
    let category = tx.category_id().unwrap_or_default().to_string();

    if view == View::Summary {
        return vec![
            Cell::new(date),
            Cell::new(&attrs.description),
            amount,
            Cell::new(&attrs.amount.currency_code),
            Cell::new(category),
        ];
    }

    let message = attrs.message.clone().unwrap_or_default();
    let (foreign_amount, foreign_currency) = match &attrs.foreign_amount {
        Some(foreign) => (view.money(foreign), foreign.currency_code.clone()),
        None => (String::new(), String::new()),
    };
    let tags = tx.tag_ids().join(", ");

    let mut cells = Vec::with_capacity(11);
    if view == View::Raw {
        cells.push(Cell::new(&tx.id));
    }
    cells.extend([
        Cell::new(date),
        Cell::new(&attrs.description),
        Cell::new(message),
        amount,
        Cell::new(&attrs.amount.currency_code),
        Cell::new(foreign_amount).set_alignment(CellAlignment::Right),
        Cell::new(foreign_currency),
    ]);
    if view == View::Raw {
        cells.push(Cell::new(attrs.status));
    }
    cells.extend([Cell::new(category), Cell::new(tags)]);
    if view == View::Raw {
        let settled = attrs.settled_at.as_ref().map(|dt| timestamp(dt, true));
        cells.push(Cell::new(settled.unwrap_or_default()));
    }
    cells
}
