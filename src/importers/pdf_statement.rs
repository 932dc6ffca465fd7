// PDF statement parser
//
// Text is pulled out with pdf-extract and scanned line by line: a line with
// a date starts a transaction and its amount is looked up in that line or the
// two following ones.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use pdf_extract::extract_text;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

use super::parsing::{parse_amount, parse_date};
use super::StatementEntry;
use crate::db::TransactionKind;
use crate::utils::{fold_text, truncate_chars};

static LINE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}").expect("valid regex"));

/// Brazilian-formatted money: optional `R$`, thousands dots, two decimals
static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:R\$\s*)?(-?\d{1,3}(?:\.\d{3})*,\d{2}|-?\d+,\d{2})").expect("valid regex")
});

const MAX_DESCRIPTION_CHARS: usize = 100;

pub fn parse_pdf<P: AsRef<Path>>(path: P) -> Result<Vec<StatementEntry>> {
    let path = path.as_ref();
    info!("Parsing PDF statement: {:?}", path);

    let text = extract_text(path).context("Failed to extract text from PDF")?;
    Ok(parse_pdf_text(&text))
}

/// Scan extracted PDF text for dated lines with amounts
pub fn parse_pdf_text(text: &str) -> Vec<StatementEntry> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut entries = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let Some(date_match) = LINE_DATE.find(line) else {
            continue;
        };

        let window_end = (i + 3).min(lines.len());
        let search_text = lines[i..window_end].join(" ");
        let Some(amount_match) = MONEY.captures(&search_text) else {
            continue;
        };
        let Some(amount) = parse_amount(&amount_match[1]) else {
            continue;
        };

        let without_date = format!("{}{}", &line[..date_match.start()], &line[date_match.end()..]);
        let stripped = MONEY.replace_all(&without_date, "");
        let description = stripped
            .replace("R$", "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if description.is_empty() {
            debug!("Skipping PDF line {} without description", i + 1);
            continue;
        }

        let folded = fold_text(line);
        let kind = if folded.contains("entrada") || folded.contains("credito") {
            TransactionKind::Income
        } else {
            TransactionKind::FixedExpense
        };

        entries.push(StatementEntry {
            date: parse_date(date_match.as_str()),
            description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            kind,
            amount: amount.abs(),
            balance: None,
            external_id: None,
        });
    }

    info!("Parsed {} entries from PDF text", entries.len());
    entries
}
