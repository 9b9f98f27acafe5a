use tracing::warn;

use crate::error::{Result, UpError};
use crate::models::{Account, MoneyObject, Transaction};

/// Label used for totals when nothing was summed.
pub const DEFAULT_CURRENCY: &str = "AUD";

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Newest first. `sort_by` is stable, so equal timestamps keep fetch order.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.attributes.created_at.cmp(&a.attributes.created_at));
}

/// Account type, then display name, both compared as raw strings.
pub fn sort_accounts(accounts: &mut [Account]) {
    accounts.sort_by(|a, b| {
        a.attributes
            .account_type
            .cmp(&b.attributes.account_type)
            .then_with(|| a.attributes.display_name.cmp(&b.attributes.display_name))
    });
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Tracks whether every summed amount shared one currency code.
#[derive(Debug, Clone, PartialEq, Default)]
enum CurrencyLabel {
    #[default]
    Empty,
    Single(String),
    Mixed,
}

impl CurrencyLabel {
    fn observe(&mut self, money: &MoneyObject) {
        match self {
            Self::Empty => *self = Self::Single(money.currency_code.clone()),
            Self::Single(code) if *code != money.currency_code => *self = Self::Mixed,
            _ => {}
        }
    }

    fn code(&self) -> Option<&str> {
        match self {
            Self::Empty => Some(DEFAULT_CURRENCY),
            Self::Single(code) => Some(code.as_str()),
            Self::Mixed => None,
        }
    }
}

fn checked_sum(total: i64, units: i64, id: &str) -> Result<i64> {
    total
        .checked_add(units)
        .ok_or_else(|| UpError::Overflow(id.to_string()))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionTotals {
    /// Sum of negative amounts, in minor units (never positive).
    pub debit: i64,
    /// Sum of zero and positive amounts, in minor units.
    pub credit: i64,
    pub count: usize,
    currency: CurrencyLabel,
}

impl TransactionTotals {
    pub fn add(&mut self, tx: &Transaction) -> Result<()> {
        let amount = &tx.attributes.amount;
        let units = amount.minor_units()?;
        let bucket = if units < 0 { &mut self.debit } else { &mut self.credit };
        *bucket = checked_sum(*bucket, units, &tx.id)?;
        self.count += 1;
        self.currency.observe(amount);
        Ok(())
    }

    /// Algebraic sum: debits are already negative, so this cannot overflow.
    pub fn net(&self) -> i64 {
        self.debit + self.credit
    }

    /// Shared currency of the summed amounts, `None` when they differ.
    pub fn currency(&self) -> Option<&str> {
        self.currency.code()
    }
}

pub fn transaction_totals(transactions: &[Transaction]) -> Result<TransactionTotals> {
    let mut totals = TransactionTotals::default();
    for tx in transactions {
        totals.add(tx)?;
    }
    if totals.currency().is_none() {
        warn!(count = totals.count, "transaction totals mix currencies; sums are not converted");
    }
    Ok(totals)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccountTotals {
    pub balance: i64,
    pub count: usize,
    currency: CurrencyLabel,
}

impl AccountTotals {
    pub fn add(&mut self, account: &Account) -> Result<()> {
        let balance = &account.attributes.balance;
        self.balance = checked_sum(self.balance, balance.minor_units()?, &account.id)?;
        self.count += 1;
        self.currency.observe(balance);
        Ok(())
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.code()
    }
}

pub fn account_totals(accounts: &[Account]) -> Result<AccountTotals> {
    let mut totals = AccountTotals::default();
    for account in accounts {
        totals.add(account)?;
    }
    if totals.currency().is_none() {
        warn!(count = totals.count, "account balances mix currencies; total is not converted");
    }
    Ok(totals)
}
