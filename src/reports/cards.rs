//! Card statements (faturas): which purchases fall in an invoice, its total,
//! limit usage and due date.

use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{self, Card, DueInstallment, Transaction, TransactionFilter};
use crate::error::FinanceError;
use crate::periods::{month_bounds, month_ref, next_month, previous_month};
use crate::utils::percent_of;

/// `day` in the given month, clamped to the month's last day
fn clamped_day(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    let (first, last) = month_bounds(year, month)?;
    Ok(first.with_day(day.min(last.day())).unwrap_or(last))
}

/// Invoice month a purchase belongs to. Purchases after the closing day
/// roll into the next month's invoice; without a closing day the invoice
/// follows the calendar month.
pub fn invoice_reference(purchase: NaiveDate, closing_day: Option<u32>) -> (i32, u32) {
    match closing_day {
        Some(day) if purchase.day() > day => next_month(purchase.year(), purchase.month()),
        _ => (purchase.year(), purchase.month()),
    }
}

/// Purchase window of an invoice: the day after the previous closing up to
/// this month's closing day (whole calendar month without a closing day)
pub fn invoice_period(year: i32, month: u32, closing_day: Option<u32>) -> Result<(NaiveDate, NaiveDate)> {
    let Some(day) = closing_day else {
        return month_bounds(year, month);
    };
    let (py, pm) = previous_month(year, month);
    let previous_close = clamped_day(py, pm, day)?;
    let start = previous_close.checked_add_days(Days::new(1)).unwrap_or(previous_close);
    Ok((start, clamped_day(year, month, day)?))
}

/// Due date of an invoice. A due day on or before the closing day falls in
/// the following month.
pub fn invoice_due_date(year: i32, month: u32, closing_day: Option<u32>, due_day: Option<u32>) -> Result<Option<NaiveDate>> {
    let Some(due) = due_day else {
        return Ok(None);
    };
    let (y, m) = match closing_day {
        Some(close) if due <= close => next_month(year, month),
        _ => (year, month),
    };
    clamped_day(y, m, due).map(Some)
}

#[derive(Debug, Clone, Serialize)]
pub struct CardStatement {
    pub card: Card,
    pub reference_month: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub transactions: Vec<Transaction>,
    pub installments: Vec<DueInstallment>,
    pub transactions_total: Decimal,
    pub installments_total: Decimal,
    pub total: Decimal,
    pub available_limit: Option<Decimal>,
    pub limit_usage_pct: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub paid: bool,
    pub overdue: bool,
}

pub fn card_statement(
    conn: &Connection,
    card_id: i64,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<CardStatement> {
    let card = db::get_card(conn, card_id)?
        .ok_or_else(|| FinanceError::NotFound(format!("card {}", card_id)))?;
    let (period_start, period_end) = invoice_period(year, month, card.closing_day)?;

    let transactions = db::list_transactions(
        conn,
        &TransactionFilter {
            from: Some(period_start),
            to: Some(period_end),
            card_id: Some(card_id),
            ..Default::default()
        },
    )?;
    let installments = db::installments_due_between(conn, period_start, period_end, Some(card_id))?;

    let transactions_total: Decimal = transactions
        .iter()
        .filter(|t| t.kind.is_expense())
        .map(|t| t.amount)
        .sum();
    let installments_total: Decimal = installments.iter().map(|i| i.installment.amount).sum();
    let total = transactions_total + installments_total;

    let available_limit = card.credit_limit.map(|limit| limit - total);
    let limit_usage_pct = card.credit_limit.and_then(|limit| percent_of(total, limit));

    let reference_month = month_ref(year, month);
    let paid = db::get_invoice(conn, card_id, &reference_month)?
        .map(|i| i.paid)
        .unwrap_or(false);
    let due_date = invoice_due_date(year, month, card.closing_day, card.due_day)?;
    let overdue = !paid && total > Decimal::ZERO && due_date.is_some_and(|due| today > due);

    Ok(CardStatement {
        card,
        reference_month,
        period_start,
        period_end,
        transactions,
        installments,
        transactions_total,
        installments_total,
        total,
        available_limit,
        limit_usage_pct,
        due_date,
        paid,
        overdue,
    })
}
