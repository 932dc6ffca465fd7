// OFX (Open Financial Exchange) statement parser
//
// Handles both SGML-style OFX 1.x (unclosed leaf tags, one per line or all on
// one line) and XML OFX 2.x. Only bank transaction blocks are read.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::parsing::{clean_description, parse_amount, parse_date};
use super::StatementEntry;
use crate::db::TransactionKind;
use crate::error::FinanceError;

static STMTTRN_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<STMTTRN>(.*?)</STMTTRN>").expect("valid regex"));

/// Account metadata found in the statement header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfxStatement {
    pub account_id: Option<String>,
    pub bank_id: Option<String>,
    pub currency: Option<String>,
    pub entries: Vec<StatementEntry>,
}

/// Value of `<FIELD>value` up to the next tag or line break
fn extract_field(text: &str, field: &str) -> Option<String> {
    let pattern = format!(r"(?i)<{}>([^<\r\n]+)", regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn looks_like_ofx(text: &str) -> bool {
    let head: String = text.chars().take(2048).collect::<String>().to_ascii_uppercase();
    head.contains("OFXHEADER") || head.contains("<OFX>")
}

/// Parse OFX text into statement entries.
///
/// Each `<STMTTRN>` block yields one entry when it has a posting date and a
/// memo (or name). Positive amounts are income, everything else is a fixed
/// expense; the FITID is kept for duplicate detection.
pub fn parse_ofx_text(text: &str) -> Result<OfxStatement, FinanceError> {
    if !looks_like_ofx(text) && !text.to_ascii_uppercase().contains("<STMTTRN>") {
        return Err(FinanceError::ParseError(
            "not an OFX document (missing OFXHEADER / <OFX>)".to_string(),
        ));
    }

    // Account fields live outside the transaction list
    let header_end = text.to_ascii_uppercase().find("<BANKTRANLIST>").unwrap_or(text.len());
    let header = &text[..header_end];

    let mut statement = OfxStatement {
        account_id: extract_field(header, "ACCTID"),
        bank_id: extract_field(header, "BANKID"),
        currency: extract_field(header, "CURDEF"),
        entries: Vec::new(),
    };

    for block in STMTTRN_BLOCK.captures_iter(text) {
        let body = &block[1];
        let date = extract_field(body, "DTPOSTED").and_then(|d| parse_date(&d));
        let description = extract_field(body, "MEMO")
            .or_else(|| extract_field(body, "NAME"))
            .map(|d| clean_description(&d))
            .unwrap_or_default();

        if date.is_none() || description.is_empty() {
            debug!("Skipping OFX transaction without date or memo");
            continue;
        }

        let value = extract_field(body, "TRNAMT")
            .and_then(|v| parse_amount(&v))
            .unwrap_or(Decimal::ZERO);
        let kind = if value > Decimal::ZERO {
            TransactionKind::Income
        } else {
            TransactionKind::FixedExpense
        };

        statement.entries.push(StatementEntry {
            date,
            description,
            kind,
            amount: value.abs(),
            balance: None,
            external_id: extract_field(body, "FITID"),
        });
    }

    info!(
        "Parsed {} entries from OFX (account {:?})",
        statement.entries.len(),
        statement.account_id
    );
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const SGML: &str = "OFXHEADER:100
DATA:OFXSGML
<OFX>
<BANKMSGSRSV1><STMTTRNRS><STMTRS>
<CURDEF>BRL
<BANKACCTFROM>
<BANKID>0260
<ACCTID>12345-6
</BANKACCTFROM>
<BANKTRANLIST>
<STMTTRN>
<TRNTYPE>DEBIT
<DTPOSTED>20250110000000[-3:BRT]
<TRNAMT>-89.90
<FITID>abc-1
<MEMO>Compra no débito - Mercado
</STMTTRN>
<STMTTRN>
<TRNTYPE>CREDIT
<DTPOSTED>20250115
<TRNAMT>3500.00
<FITID>abc-2
<NAME>Salario
</STMTTRN>
</BANKTRANLIST>
</STMTRS></STMTTRNRS></BANKMSGSRSV1>
</OFX>";

    #[test]
    fn test_parse_sgml_statement() {
        let statement = parse_ofx_text(SGML).unwrap();
        assert_eq!(statement.account_id.as_deref(), Some("12345-6"));
        assert_eq!(statement.bank_id.as_deref(), Some("0260"));
        assert_eq!(statement.currency.as_deref(), Some("BRL"));
        assert_eq!(statement.entries.len(), 2);

        let first = &statement.entries[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(first.amount, dec!(89.90));
        assert_eq!(first.kind, TransactionKind::FixedExpense);
        assert_eq!(first.description, "Compra no débito - Mercado");
        assert_eq!(first.external_id.as_deref(), Some("abc-1"));

        let second = &statement.entries[1];
        assert_eq!(second.kind, TransactionKind::Income);
        assert_eq!(second.description, "Salario");
    }

    #[test]
    fn test_parse_single_line_xml() {
        let xml = "<?xml version=\"1.0\"?><OFX><STMTTRN><DTPOSTED>20250201</DTPOSTED>\
                   <TRNAMT>-10.00</TRNAMT><MEMO>Tarifa</MEMO></STMTTRN></OFX>";
        let statement = parse_ofx_text(xml).unwrap();
        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].amount, dec!(10.00));
        assert_eq!(statement.entries[0].external_id, None);
    }

    #[test]
    fn test_blocks_without_memo_are_skipped() {
        let text = "<OFX><STMTTRN><DTPOSTED>20250201<TRNAMT>-1.00</STMTTRN></OFX>";
        assert!(parse_ofx_text(text).unwrap().entries.is_empty());
    }

    #[test]
    fn test_rejects_non_ofx() {
        assert!(parse_ofx_text("Data;Valor\n01/01/2025;10").is_err());
    }
}
