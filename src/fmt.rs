use chrono::{DateTime, FixedOffset, SecondsFormat};

const PRETTY_TIMESTAMP: &str = "%b %d, %Y %H:%M";

/// Format minor units (cents) with thousands separators: 1234567 -> 12,345.67
pub fn money(minor_units: i64) -> String {
    let (sign, whole, cents) = split_minor(minor_units);
    let digits = whole.to_string();

    let mut with_commas = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    format!("{sign}{with_commas}.{cents:02}")
}

/// Format minor units without separators: 1234567 -> 12345.67
pub fn plain_money(minor_units: i64) -> String {
    let (sign, whole, cents) = split_minor(minor_units);
    format!("{sign}{whole}.{cents:02}")
}

fn split_minor(minor_units: i64) -> (&'static str, u64, u64) {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    (sign, abs / 100, abs % 100)
}

pub fn timestamp(dt: &DateTime<FixedOffset>, raw: bool) -> String {
    if raw {
        dt.to_rfc3339_opts(SecondsFormat::Secs, false)
    } else {
        dt.format(PRETTY_TIMESTAMP).to_string()
    }
}

/// Account timestamps arrive as plain strings; anything unparseable is shown as-is.
pub fn created_at(value: &str, raw: bool) -> String {
    if raw {
        return value.to_string();
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => timestamp(&dt, false),
        Err(_) => value.to_string(),
    }
}
