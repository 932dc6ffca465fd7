// Import module - bank statement parsers (CSV, OFX, PDF) and ledger import

pub mod csv_statement;
pub mod ofx;
pub mod parsing;
pub mod pdf_statement;
mod store;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use crate::db::TransactionKind;
use crate::utils::fold_text;

pub use parsing::{detect_kind, parse_amount, parse_date};
pub use store::{save_entries, ImportOptions, ImportSummary};

/// One line of a bank statement. `amount` is absolute; `kind` gives the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementEntry {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance: Option<Decimal>,
    /// Bank-provided id (OFX FITID) when available
    pub external_id: Option<String>,
}

/// Supported statement formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatementFormat {
    Csv,
    Ofx,
    Pdf,
}

impl StatementFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementFormat::Csv => "csv",
            StatementFormat::Ofx => "ofx",
            StatementFormat::Pdf => "pdf",
        }
    }
}

/// Parsed statement with whatever account metadata the format carries
#[derive(Debug, Clone, Serialize)]
pub struct ParsedStatement {
    pub format: StatementFormat,
    pub entries: Vec<StatementEntry>,
    pub account_id: Option<String>,
    pub currency: Option<String>,
}

/// Detect the statement format from the extension, then from content
///
/// Detection strategy:
/// - `.csv` / `.txt` → CSV, `.ofx` / `.qfx` → OFX, `.pdf` → PDF
/// - otherwise sniff: `%PDF` magic → PDF, `OFXHEADER` / `<OFX>` → OFX
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<StatementFormat> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => return Ok(StatementFormat::Csv),
        "ofx" | "qfx" => return Ok(StatementFormat::Ofx),
        "pdf" => return Ok(StatementFormat::Pdf),
        _ => {}
    }

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    detect_format_from_bytes(&bytes).ok_or_else(|| {
        anyhow!(
            "Could not determine statement format of {:?}. Supported formats: .csv, .ofx, .pdf",
            path
        )
    })
}

/// Content sniffing used when the extension says nothing
pub fn detect_format_from_bytes(bytes: &[u8]) -> Option<StatementFormat> {
    if bytes.starts_with(b"%PDF") {
        return Some(StatementFormat::Pdf);
    }
    let text = parsing::decode_text(&bytes[..bytes.len().min(4096)]);
    if ofx::looks_like_ofx(&text) {
        return Some(StatementFormat::Ofx);
    }
    if text.contains(';') || text.contains(',') {
        return Some(StatementFormat::Csv);
    }
    None
}

/// Parse a statement file with automatic format detection
pub fn parse_statement<P: AsRef<Path>>(path: P) -> Result<ParsedStatement> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    info!("Importing statement {:?} (format: {})", path, format.as_str());

    match format {
        StatementFormat::Pdf => Ok(ParsedStatement {
            format,
            entries: pdf_statement::parse_pdf(path)?,
            account_id: None,
            currency: None,
        }),
        _ => {
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
            parse_statement_text(&parsing::decode_text(&bytes), format)
        }
    }
}

/// Parse already-decoded statement text (CSV or OFX; PDF text uses the line scanner)
pub fn parse_statement_text(text: &str, format: StatementFormat) -> Result<ParsedStatement> {
    match format {
        StatementFormat::Csv => Ok(ParsedStatement {
            format,
            entries: csv_statement::parse_csv_text(text)?,
            account_id: None,
            currency: None,
        }),
        StatementFormat::Ofx => {
            let statement = ofx::parse_ofx_text(text)?;
            Ok(ParsedStatement {
                format,
                entries: statement.entries,
                account_id: statement.account_id,
                currency: statement.currency,
            })
        }
        StatementFormat::Pdf => Ok(ParsedStatement {
            format,
            entries: pdf_statement::parse_pdf_text(text),
            account_id: None,
            currency: None,
        }),
    }
}

/// Stable fingerprints for duplicate detection across imports.
///
/// Entries with a bank id hash that id; the rest hash date, kind, amount and
/// the folded description. Identical lines inside one statement get an
/// occurrence counter so two equal coffees on the same day both survive.
pub fn fingerprint_entries(entries: &[StatementEntry]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    entries
        .iter()
        .map(|entry| {
            let key = match &entry.external_id {
                Some(id) => format!("fitid|{}", id),
                None => format!(
                    "{}|{}|{}|{}",
                    entry.date.map(|d| d.to_string()).unwrap_or_default(),
                    entry.kind.as_str(),
                    entry.amount.normalize(),
                    fold_text(&entry.description)
                ),
            };
            let occurrence = seen.entry(key.clone()).or_insert(0);
            *occurrence += 1;
            let hash = blake3::hash(format!("{}#{}", key, occurrence).as_bytes());
            hash.to_hex().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(desc: &str, amount: Decimal) -> StatementEntry {
        StatementEntry {
            date: NaiveDate::from_ymd_opt(2025, 1, 10),
            description: desc.to_string(),
            kind: TransactionKind::DailyExpense,
            amount,
            balance: None,
            external_id: None,
        }
    }

    #[test]
    fn test_detect_format_by_extension() {
        assert_eq!(detect_format("extrato.CSV").unwrap(), StatementFormat::Csv);
        assert_eq!(detect_format("extrato.qfx").unwrap(), StatementFormat::Ofx);
        assert_eq!(detect_format("extrato.pdf").unwrap(), StatementFormat::Pdf);
    }

    #[test]
    fn test_detect_format_by_content() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "OFXHEADER:100\n<OFX>").unwrap();
        assert_eq!(detect_format(file.path()).unwrap(), StatementFormat::Ofx);

        assert_eq!(detect_format_from_bytes(b"%PDF-1.7"), Some(StatementFormat::Pdf));
        assert_eq!(detect_format_from_bytes(b"a;b;c"), Some(StatementFormat::Csv));
        assert_eq!(detect_format_from_bytes(b"nothing here"), None);
    }

    #[test]
    fn test_fingerprints_stable_and_distinguish_repeats() {
        let entries = vec![
            entry("Café", dec!(5.50)),
            entry("Café", dec!(5.5)),
            entry("Padaria", dec!(5.50)),
        ];
        let first = fingerprint_entries(&entries);
        let second = fingerprint_entries(&entries);
        assert_eq!(first, second);
        // Same line twice in one statement must not collapse
        assert_ne!(first[0], first[1]);
        assert_ne!(first[0], first[2]);
    }

    #[test]
    fn test_fingerprint_ignores_accents_and_case() {
        let a = fingerprint_entries(&[entry("CAFÉ", dec!(5))]);
        let b = fingerprint_entries(&[entry("cafe", dec!(5))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_prefers_bank_id() {
        let mut with_id = entry("A", dec!(1));
        with_id.external_id = Some("X1".to_string());
        let mut other = entry("B", dec!(2));
        other.external_id = Some("X1".to_string());
        assert_eq!(fingerprint_entries(&[with_id]), fingerprint_entries(&[other]));
    }

    #[test]
    fn test_parse_statement_text_csv() {
        let parsed =
            parse_statement_text("Data;Descrição;Valor\n01/01/2025;Padaria;-3,00\n", StatementFormat::Csv)
                .unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.format, StatementFormat::Csv);
    }
}
