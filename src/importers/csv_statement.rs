use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use super::parsing::{clean_description, detect_kind, parse_amount, parse_date};
use super::StatementEntry;
use crate::utils::fold_text;

#[derive(Debug, PartialEq, Eq)]
struct CsvColumnMapping {
    date: usize,
    description: usize,
    amount: Option<usize>,
    balance: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
}

impl CsvColumnMapping {
    /// `date, description, amount, balance` layout used when headers say nothing
    fn positional() -> Self {
        Self {
            date: 0,
            description: 1,
            amount: Some(2),
            balance: Some(3),
            debit: None,
            credit: None,
        }
    }
}

/// Pick the delimiter that splits the first line into more fields
fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if tabs > semicolons && tabs > commas {
        b'\t'
    } else if semicolons >= commas && semicolons > 0 {
        b';'
    } else {
        b','
    }
}

/// Map columns by header keywords. Returns None when the row does not look
/// like a header (no date or description column).
fn find_columns(headers: &StringRecord) -> Option<CsvColumnMapping> {
    let mut date_idx = None;
    let mut description_idx = None;
    let mut amount_idx = None;
    let mut balance_idx = None;
    let mut debit_idx = None;
    let mut credit_idx = None;

    for (idx, header) in headers.iter().enumerate() {
        let text = fold_text(header.trim());
        if text.is_empty() {
            continue;
        }

        if date_idx.is_none() && (text.starts_with("data") || text.starts_with("date") || text == "dt") {
            date_idx = Some(idx);
        } else if text.contains("saldo") || text.contains("balance") {
            balance_idx.get_or_insert(idx);
        } else if text.contains("debito") || text.contains("saida") || text.contains("debit") {
            debit_idx.get_or_insert(idx);
        } else if text.contains("credito") || text.contains("entrada") || text.contains("credit") {
            credit_idx.get_or_insert(idx);
        } else if text.contains("valor") || text.contains("amount") || text.contains("quantia") || text == "value" {
            amount_idx.get_or_insert(idx);
        } else if text.contains("descri")
            || text.contains("historico")
            || text.contains("lancamento")
            || text.contains("estabelecimento")
            || text.contains("memo")
            || text.contains("title")
            || text.contains("titulo")
        {
            description_idx.get_or_insert(idx);
        }
    }

    let mapping = CsvColumnMapping {
        date: date_idx?,
        description: description_idx?,
        amount: amount_idx,
        balance: balance_idx,
        debit: debit_idx,
        credit: credit_idx,
    };
    if mapping.amount.is_none() && mapping.debit.is_none() && mapping.credit.is_none() {
        return None;
    }
    Some(mapping)
}

/// Parse a bank CSV export already decoded to text
pub fn parse_csv_text(text: &str) -> Result<Vec<StatementEntry>> {
    let delimiter = sniff_delimiter(text);
    debug!("CSV delimiter: {:?}", delimiter as char);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let Some(first) = records.next() else {
        return Ok(Vec::new());
    };
    let first = first.context("Failed to read CSV header")?;

    // A first row that already carries a date is data, not a header
    let first_is_data = first.get(0).and_then(parse_date).is_some();
    let mapping = if first_is_data {
        CsvColumnMapping::positional()
    } else {
        find_columns(&first).unwrap_or_else(CsvColumnMapping::positional)
    };
    debug!("Column mapping: {:?}", mapping);

    let mut entries = Vec::new();
    let pending = first_is_data.then_some(Ok(first));

    for (idx, result) in pending.into_iter().chain(records).enumerate() {
        let line = if first_is_data { idx + 1 } else { idx + 2 };
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping CSV line {}: {}", line, e);
                continue;
            }
        };
        if let Some(entry) = parse_csv_row(&record, &mapping, line) {
            entries.push(entry);
        }
    }

    info!("Parsed {} entries from CSV", entries.len());
    Ok(entries)
}

fn parse_csv_row(record: &StringRecord, mapping: &CsvColumnMapping, line: usize) -> Option<StatementEntry> {
    let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

    let date = parse_date(field(Some(mapping.date)));
    let description = clean_description(field(Some(mapping.description)));
    if date.is_none() || description.is_empty() {
        debug!("Skipping CSV line {}: missing date or description", line);
        return None;
    }

    let signed = match mapping.amount.and_then(|i| record.get(i)).and_then(parse_amount) {
        Some(amount) => Some(amount),
        None => {
            let credit = parse_amount(field(mapping.credit)).map(|v| v.abs());
            let debit = parse_amount(field(mapping.debit)).map(|v| v.abs());
            match (credit, debit) {
                (None, None) => None,
                (c, d) => Some(c.unwrap_or_default() - d.unwrap_or_default()),
            }
        }
    };
    let Some(signed) = signed else {
        warn!("Skipping CSV line {}: no amount", line);
        return None;
    };

    Some(StatementEntry {
        date,
        kind: detect_kind(&description, Some(signed)),
        description,
        amount: signed.abs(),
        balance: parse_amount(field(mapping.balance)),
        external_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TransactionKind;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_semicolon_export_with_headers() {
        let csv = "Data;Histórico;Valor;Saldo\n\
                   05/01/2025;SALARIO ACME;5.000,00;6.000,00\n\
                   06/01/2025;COMPRA DEBITO PADARIA;-12,50;5.987,50\n";
        let entries = parse_csv_text(csv).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2025, 1, 5));
        assert_eq!(entries[0].kind, TransactionKind::Income);
        assert_eq!(entries[0].amount, dec!(5000.00));
        assert_eq!(entries[0].balance, Some(dec!(6000.00)));

        assert_eq!(entries[1].kind, TransactionKind::DailyExpense);
        assert_eq!(entries[1].amount, dec!(12.50));
    }

    #[test]
    fn test_comma_export_positional_without_header_keywords() {
        let csv = "col1,col2,col3,col4\n2025-02-01,Aluguel,-1500.00,0\n";
        let entries = parse_csv_text(csv).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, TransactionKind::FixedExpense);
        assert_eq!(entries[0].amount, dec!(1500.00));
    }

    #[test]
    fn test_headerless_file_keeps_first_row() {
        let csv = "01/03/2025;PIX ENVIADO;-40,00\n02/03/2025;PIX RECEBIDO;40,00\n";
        let entries = parse_csv_text(csv).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, TransactionKind::FixedExpense);
        assert_eq!(entries[1].kind, TransactionKind::Income);
    }

    #[test]
    fn test_separate_debit_credit_columns() {
        let csv = "Data Lançamento;Descrição;Crédito (R$);Débito (R$)\n\
                   10/04/2025;Compra mercado;;230,10\n\
                   11/04/2025;Reembolso;50,00;\n";
        let entries = parse_csv_text(csv).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, TransactionKind::DailyExpense);
        assert_eq!(entries[0].amount, dec!(230.10));
        assert_eq!(entries[1].kind, TransactionKind::Income);
    }

    #[test]
    fn test_rows_without_date_or_description_skipped() {
        let csv = "Data;Descrição;Valor\n;Sem data;-1,00\n07/01/2025;;-1,00\nTotal;;-2,00\n";
        assert!(parse_csv_text(csv).unwrap().is_empty());
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a;b;c"), b';');
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
    }
}
