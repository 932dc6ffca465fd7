//! Cards, invoices (faturas) and installment purchases

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::info;

use super::models::{Card, Installment, InstallmentPurchase, Invoice};
use super::{get_decimal_value, get_optional_decimal_value, parse_enum};
use crate::calculators::installments::split_purchase;
use crate::error::FinanceError;

const CARD_COLUMNS: &str =
    "id, name, card_type, credit_limit, closing_day, due_day, account_id, active";

fn card_from_row(row: &Row) -> Result<Card, rusqlite::Error> {
    let card_type: String = row.get(2)?;
    Ok(Card {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        card_type: parse_enum(&card_type, 2)?,
        credit_limit: get_optional_decimal_value(row, 3)?,
        closing_day: row.get(4)?,
        due_day: row.get(5)?,
        account_id: row.get(6)?,
        active: row.get(7)?,
    })
}

pub fn insert_card(conn: &Connection, card: &Card) -> Result<i64> {
    for day in [card.closing_day, card.due_day].into_iter().flatten() {
        if !(1..=31).contains(&day) {
            return Err(crate::error::invalid(format!("invalid day of month {}", day)));
        }
    }
    conn.execute(
        "INSERT INTO cards (name, card_type, credit_limit, closing_day, due_day, account_id, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            card.name,
            card.card_type.as_str(),
            card.credit_limit.map(|l| l.to_string()),
            card.closing_day,
            card.due_day,
            card.account_id,
            card.active,
        ],
    )
    .with_context(|| format!("Failed to create card '{}'", card.name))?;
    Ok(conn.last_insert_rowid())
}

pub fn list_cards(conn: &Connection) -> Result<Vec<Card>> {
    let sql = format!("SELECT {} FROM cards ORDER BY active DESC, name", CARD_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let cards = stmt
        .query_map([], card_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cards)
}

pub fn get_card(conn: &Connection, id: i64) -> Result<Option<Card>> {
    let sql = format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS);
    Ok(conn.query_row(&sql, params![id], card_from_row).optional()?)
}

pub fn find_card_by_name(conn: &Connection, name: &str) -> Result<Option<Card>> {
    let sql = format!("SELECT {} FROM cards WHERE name = ?1 COLLATE NOCASE", CARD_COLUMNS);
    Ok(conn.query_row(&sql, params![name], card_from_row).optional()?)
}

// ---------------------------------------------------------------------------
// Invoices

fn invoice_from_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        card_id: row.get(1)?,
        reference_month: row.get(2)?,
        paid: row.get(3)?,
        paid_at: row.get(4)?,
    })
}

pub fn get_invoice(conn: &Connection, card_id: i64, reference_month: &str) -> Result<Option<Invoice>> {
    Ok(conn
        .query_row(
            "SELECT id, card_id, reference_month, paid, paid_at FROM invoices
             WHERE card_id = ?1 AND reference_month = ?2",
            params![card_id, reference_month],
            invoice_from_row,
        )
        .optional()?)
}

/// Return the invoice row for a card and `YYYY-MM` reference, creating it unpaid
pub fn ensure_invoice(conn: &Connection, card_id: i64, reference_month: &str) -> Result<Invoice> {
    crate::periods::parse_month_ref(reference_month)?;
    get_card(conn, card_id)?.ok_or_else(|| FinanceError::NotFound(format!("card {}", card_id)))?;

    conn.execute(
        "INSERT OR IGNORE INTO invoices (card_id, reference_month) VALUES (?1, ?2)",
        params![card_id, reference_month],
    )?;
    get_invoice(conn, card_id, reference_month)?
        .ok_or_else(|| FinanceError::DbError("invoice vanished after insert".into()).into())
}

pub fn set_invoice_paid(
    conn: &Connection,
    card_id: i64,
    reference_month: &str,
    paid: bool,
) -> Result<Invoice> {
    let invoice = ensure_invoice(conn, card_id, reference_month)?;
    conn.execute(
        "UPDATE invoices
         SET paid = ?1, paid_at = CASE WHEN ?1 THEN CURRENT_TIMESTAMP ELSE NULL END
         WHERE id = ?2",
        params![paid, invoice.id],
    )?;
    info!(
        "Invoice {} of card {} marked {}",
        reference_month,
        card_id,
        if paid { "paid" } else { "unpaid" }
    );
    get_invoice(conn, card_id, reference_month)?
        .ok_or_else(|| FinanceError::DbError("invoice vanished after update".into()).into())
}

// ---------------------------------------------------------------------------
// Installments

/// Record a purchase and its installment schedule
pub fn create_installment_purchase(
    conn: &Connection,
    purchase: &InstallmentPurchase,
) -> Result<(i64, Vec<Installment>)> {
    let plan = split_purchase(
        purchase.total_amount,
        purchase.installment_count,
        purchase.first_due_date,
    )?;

    let db_tx = conn.unchecked_transaction()?;
    db_tx.execute(
        "INSERT INTO installment_purchases
            (description, total_amount, installment_count, first_due_date, card_id, category_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            purchase.description,
            purchase.total_amount.to_string(),
            purchase.installment_count,
            purchase.first_due_date,
            purchase.card_id,
            purchase.category_id,
        ],
    )?;
    let purchase_id = db_tx.last_insert_rowid();

    let mut installments = Vec::with_capacity(plan.len());
    for item in plan {
        db_tx.execute(
            "INSERT INTO installments (purchase_id, number, amount, due_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![purchase_id, item.number, item.amount.to_string(), item.due_date],
        )?;
        installments.push(Installment {
            id: Some(db_tx.last_insert_rowid()),
            purchase_id,
            number: item.number,
            amount: item.amount,
            due_date: item.due_date,
            paid: false,
        });
    }
    db_tx.commit()?;

    info!(
        "Created installment purchase '{}' in {}x",
        purchase.description, purchase.installment_count
    );
    Ok((purchase_id, installments))
}

pub fn list_installment_purchases(conn: &Connection) -> Result<Vec<InstallmentPurchase>> {
    let mut stmt = conn.prepare(
        "SELECT id, description, total_amount, installment_count, first_due_date, card_id, category_id
         FROM installment_purchases ORDER BY first_due_date DESC, id DESC",
    )?;
    let purchases = stmt
        .query_map([], |row| {
            Ok(InstallmentPurchase {
                id: Some(row.get(0)?),
                description: row.get(1)?,
                total_amount: get_decimal_value(row, 2)?,
                installment_count: row.get(3)?,
                first_due_date: row.get(4)?,
                card_id: row.get(5)?,
                category_id: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(purchases)
}

fn installment_from_row(row: &Row) -> Result<Installment, rusqlite::Error> {
    Ok(Installment {
        id: Some(row.get(0)?),
        purchase_id: row.get(1)?,
        number: row.get(2)?,
        amount: get_decimal_value(row, 3)?,
        due_date: row.get(4)?,
        paid: row.get(5)?,
    })
}

pub fn list_purchase_installments(conn: &Connection, purchase_id: i64) -> Result<Vec<Installment>> {
    let mut stmt = conn.prepare(
        "SELECT id, purchase_id, number, amount, due_date, paid
         FROM installments WHERE purchase_id = ?1 ORDER BY number",
    )?;
    let items = stmt
        .query_map(params![purchase_id], installment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Installment due in a window, with its purchase description
#[derive(Debug, Clone, Serialize)]
pub struct DueInstallment {
    pub installment: Installment,
    pub description: String,
    pub installment_count: u32,
    pub card_id: Option<i64>,
}

/// Installments with a due date in `[from, to]`, optionally for one card
pub fn installments_due_between(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    card_id: Option<i64>,
) -> Result<Vec<DueInstallment>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.purchase_id, i.number, i.amount, i.due_date, i.paid,
                p.description, p.installment_count, p.card_id
         FROM installments i JOIN installment_purchases p ON p.id = i.purchase_id
         WHERE i.due_date >= ?1 AND i.due_date <= ?2 AND (?3 IS NULL OR p.card_id = ?3)
         ORDER BY i.due_date, i.id",
    )?;
    let items = stmt
        .query_map(params![from, to, card_id], |row| {
            Ok(DueInstallment {
                installment: installment_from_row(row)?,
                description: row.get(6)?,
                installment_count: row.get(7)?,
                card_id: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

pub fn set_installment_paid(conn: &Connection, installment_id: i64, paid: bool) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE installments SET paid = ?1 WHERE id = ?2",
        params![paid, installment_id],
    )?;
    Ok(changed > 0)
}
