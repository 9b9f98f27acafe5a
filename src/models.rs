use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::error::{Result, UpError};

/// A monetary amount as the provider sends it: a display string plus an
/// integer count of minor units. Arithmetic only ever uses the integer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyObject {
    pub currency_code: String,
    pub value: String,
    #[serde(default)]
    pub value_in_base_units: Option<i64>,
}

impl MoneyObject {
    pub fn minor_units(&self) -> Result<i64> {
        match self.value_in_base_units {
            Some(units) => Ok(units),
            None => parse_minor_units(&self.value),
        }
    }
}

/// Convert a decimal string with at most two fractional digits into minor
/// units without going through floating point.
pub fn parse_minor_units(raw: &str) -> Result<i64> {
    let invalid = || UpError::NumericParse(raw.to_string());
    let s = raw.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty()
        || frac.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }
    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let cents: i64 = format!("{frac:0<2}").parse().map_err(|_| invalid())?;
    let total = whole
        .checked_mul(100)
        .and_then(|w| w.checked_add(cents))
        .ok_or_else(invalid)?;
    Ok(if negative { -total } else { total })
}

// ---------------------------------------------------------------------------
// Pagination envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<String>,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub attributes: AccountAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributes {
    pub display_name: String,
    pub account_type: String,
    pub ownership_type: String,
    pub balance: MoneyObject,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Held,
    Settled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Held => "HELD",
            Self::Settled => "SETTLED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub attributes: TransactionAttributes,
    #[serde(default)]
    pub relationships: TransactionRelationships,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub status: TransactionStatus,
    pub description: String,
    #[serde(default)]
    pub message: Option<String>,
    pub amount: MoneyObject,
    #[serde(default)]
    pub foreign_amount: Option<MoneyObject>,
    #[serde(default)]
    pub settled_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
}

/// Identifier-only pointer to another resource (category, tag).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToOne {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToMany {
    #[serde(default)]
    pub data: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRelationships {
    #[serde(default)]
    pub category: ToOne,
    #[serde(default)]
    pub tags: ToMany,
}

impl Transaction {
    pub fn category_id(&self) -> Option<&str> {
        self.relationships.category.data.as_ref().map(|c| c.id.as_str())
    }

    pub fn tag_ids(&self) -> Vec<&str> {
        self.relationships.tags.data.iter().map(|t| t.id.as_str()).collect()
    }
}
