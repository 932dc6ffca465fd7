use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use super::fingerprint_entries;
use crate::analysis::ClassifiedEntry;
use crate::db::{self, Transaction};

/// How imported lines are written to the ledger
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub account_id: Option<i64>,
    /// Stored in `transactions.source` (e.g. "import:csv")
    pub source: String,
    /// Count what would happen without writing
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            account_id: None,
            source: "import".to_string(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub duplicates: usize,
    /// Lines without a date or with a zero amount
    pub skipped: usize,
    pub errors: usize,
}

/// Persist classified statement entries as transactions.
///
/// Lines already imported (same fingerprint) are counted as duplicates.
/// Categories are matched by name; unknown names leave the category empty.
pub fn save_entries(
    conn: &Connection,
    entries: &[ClassifiedEntry],
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let statement: Vec<_> = entries.iter().map(|e| e.entry.clone()).collect();
    let fingerprints = fingerprint_entries(&statement);
    let mut summary = ImportSummary::default();
    let mut category_ids: HashMap<String, Option<i64>> = HashMap::new();

    for (item, fingerprint) in entries.iter().zip(fingerprints) {
        let entry = &item.entry;
        let Some(date) = entry.date else {
            warn!("Skipping statement line without date: {}", entry.description);
            summary.skipped += 1;
            continue;
        };
        if entry.amount == Decimal::ZERO {
            summary.skipped += 1;
            continue;
        }
        if db::fingerprint_exists(conn, &fingerprint)? {
            summary.duplicates += 1;
            continue;
        }
        if options.dry_run {
            summary.inserted += 1;
            continue;
        }

        let category_id = match category_ids.get(&item.category) {
            Some(id) => *id,
            None => {
                let id = db::find_category(conn, &item.category)?.and_then(|c| c.id);
                category_ids.insert(item.category.clone(), id);
                id
            }
        };

        let mut tx = Transaction::new(entry.kind, entry.amount.abs(), &entry.description, date);
        tx.category_id = category_id;
        tx.account_id = options.account_id;
        tx.source = options.source.clone();
        tx.fingerprint = Some(fingerprint);

        match db::insert_transaction(conn, &tx) {
            Ok(_) => summary.inserted += 1,
            Err(e) => {
                warn!("Error inserting imported transaction {:?}: {}", entry.description, e);
                summary.errors += 1;
            }
        }
    }

    info!(
        "Import finished: {} inserted, {} duplicates, {} skipped, {} errors",
        summary.inserted, summary.duplicates, summary.skipped, summary.errors
    );
    Ok(summary)
}
