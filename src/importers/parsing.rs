// Shared field parsers for bank statements: dates, amounts, text decoding
// and transaction-kind detection.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::db::TransactionKind;
use crate::utils::fold_text;

static DMY_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})").expect("valid regex"));
static YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})[/\-](\d{2})[/\-](\d{2})").expect("valid regex"));
static COMPACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{8})").expect("valid regex"));
static DMY_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})[/\-](\d{1,2})[/\-](\d{2})").expect("valid regex"));

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Parse a statement date.
///
/// Accepted, in order: `DD/MM/YYYY` (or `-`), `YYYY-MM-DD`, eight digits
/// (`YYYYMMDD`, else `DDMMYYYY`; also covers OFX timestamps like
/// `20250115120000[-3:BRT]`) and `DD/MM/YY` read as 20YY.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(c) = DMY_LONG.captures(value) {
        if let Some(date) = ymd(&c[3], &c[2], &c[1]) {
            return Some(date);
        }
    }
    if let Some(c) = YMD.captures(value) {
        if let Some(date) = ymd(&c[1], &c[2], &c[3]) {
            return Some(date);
        }
    }
    if let Some(c) = COMPACT.captures(value) {
        let digits = &c[1];
        let as_ymd = ymd(&digits[0..4], &digits[4..6], &digits[6..8]);
        if let Some(date) = as_ymd.filter(|_| digits.starts_with("19") || digits.starts_with("20")) {
            return Some(date);
        }
        if let Some(date) = ymd(&digits[4..8], &digits[2..4], &digits[0..2]) {
            return Some(date);
        }
    }
    if let Some(c) = DMY_SHORT.captures(value) {
        let year = format!("20{}", &c[3]);
        if let Some(date) = ymd(&year, &c[2], &c[1]) {
            return Some(date);
        }
    }

    debug!("Unrecognized date: {:?}", value);
    None
}

/// Parse a signed money amount.
///
/// Understands `1.234,56`, `1,234.56`, `R$` prefixes, leading or trailing
/// minus and accounting parentheses. When both separators appear, the last
/// one is the decimal separator. A lone `.` or `,` followed by digits is a
/// decimal separator; repeated ones are thousands groups.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let negative = trimmed.starts_with('-')
        || trimmed.ends_with('-')
        || (trimmed.starts_with('(') && trimmed.ends_with(')'))
        || trimmed.contains("-R$")
        || trimmed.contains("R$ -")
        || trimmed.contains("R$-");

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let last_dot = cleaned.rfind('.');
    let last_comma = cleaned.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (None, Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    let amount = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -amount } else { amount })
}

/// Classify a statement line as income, fixed or daily expense.
///
/// A positive signed amount is always income. Otherwise description
/// keywords decide (accent-insensitive); anything unknown is a fixed expense.
pub fn detect_kind(description: &str, signed_amount: Option<Decimal>) -> TransactionKind {
    if signed_amount.is_some_and(|v| v > Decimal::ZERO) {
        return TransactionKind::Income;
    }

    let desc = fold_text(description);
    let has = |words: &[&str]| words.iter().any(|w| desc.contains(w));

    if has(&["salario", "pagamento"]) {
        TransactionKind::Income
    } else if has(&["aluguel", "luz", "agua", "internet"]) {
        TransactionKind::FixedExpense
    } else if has(&["pix", "transferencia"]) {
        TransactionKind::FixedExpense
    } else if has(&["debito", "compra"]) {
        TransactionKind::DailyExpense
    } else {
        TransactionKind::FixedExpense
    }
}

/// Decode statement bytes: UTF-8 (BOM stripped), falling back to Windows-1252
/// which most Brazilian bank exports use.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            debug!("Statement decoded as Windows-1252");
            text.into_owned()
        }
    }
}

/// Collapse runs of whitespace and strip quotes left by exports
pub fn clean_description(value: &str) -> String {
    value
        .replace(['"', '\''], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
