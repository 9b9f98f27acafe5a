use chrono::{DateTime, FixedOffset};

use crate::dates::{parse_date_time, to_query_value};
use crate::error::{Result, UpError};
use crate::models::Transaction;

/// Ordered request parameters. Empty filters never appear here.
pub type QueryParams = Vec<(&'static str, String)>;

fn push_if_set(params: &mut QueryParams, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        params.push((key, v.to_string()));
    }
}

/// Treat blank CLI values the same as omitted ones.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a `--since` / `--until` value, keeping the flag name in the error.
pub fn parse_date_flag(field: &'static str, value: Option<&str>) -> Result<Option<DateTime<FixedOffset>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => parse_date_time(v).map(Some).map_err(|e| match e {
            UpError::InvalidDateFormat { input, .. } => UpError::InvalidDateFormat { field, input },
            other => other,
        }),
    }
}

// ---------------------------------------------------------------------------
// Server-side filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountQuery {
    pub account_type: Option<String>,
    pub ownership_type: Option<String>,
}

impl AccountQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_if_set(&mut params, "filter[accountType]", self.account_type.as_deref());
        push_if_set(&mut params, "filter[ownershipType]", self.ownership_type.as_deref());
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub status: Option<String>,
    pub since: Option<DateTime<FixedOffset>>,
    pub until: Option<DateTime<FixedOffset>>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub page_size: Option<u32>,
}

impl TransactionQuery {
    pub fn params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        push_if_set(&mut params, "filter[status]", self.status.as_deref());
        if let Some(since) = &self.since {
            params.push(("filter[since]", to_query_value(since)));
        }
        if let Some(until) = &self.until {
            params.push(("filter[until]", to_query_value(until)));
        }
        push_if_set(&mut params, "filter[category]", self.category.as_deref());
        push_if_set(&mut params, "filter[tag]", self.tag.as_deref());
        if let Some(size) = self.page_size {
            params.push(("page[size]", size.to_string()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Client-side filters
// ---------------------------------------------------------------------------

/// Predicates the API cannot evaluate, applied after every page is fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientFilter {
    /// Foreign currency code, case-insensitive.
    pub currency: Option<String>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
}

impl ClientFilter {
    pub fn is_empty(&self) -> bool {
        self.currency.is_none() && self.description.is_none()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.matches_currency(tx) && self.matches_description(tx)
    }

    fn matches_currency(&self, tx: &Transaction) -> bool {
        let Some(code) = self.currency.as_deref() else {
            return true;
        };
        tx.attributes
            .foreign_amount
            .as_ref()
            .is_some_and(|foreign| foreign.currency_code.eq_ignore_ascii_case(code.trim()))
    }

    fn matches_description(&self, tx: &Transaction) -> bool {
        let Some(needle) = self.description.as_deref() else {
            return true;
        };
        tx.attributes
            .description
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    /// Keep matching transactions in their original relative order.
    pub fn apply(&self, transactions: Vec<Transaction>) -> Vec<Transaction> {
        if self.is_empty() {
            return transactions;
        }
        transactions.into_iter().filter(|tx| self.matches(tx)).collect()
    }
}
