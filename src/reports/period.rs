use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use super::monthly::{change_pct, CategoryShare};
use crate::db::{self, KindTotals};
use crate::periods::{format_period, is_current_period, period_bounds, previous_period, PeriodType};
use crate::utils::percent_of;

/// Totals for a month, week or day, compared with the period before it
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub period: PeriodType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
    pub is_current: bool,
    pub totals: KindTotals,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub categories: Vec<CategoryShare>,
    pub previous: KindTotals,
    pub expense_change_pct: Option<Decimal>,
}

pub fn period_summary(
    conn: &Connection,
    anchor: NaiveDate,
    period: PeriodType,
    today: NaiveDate,
) -> Result<PeriodSummary> {
    let (start, end) = period_bounds(anchor, period)?;
    let totals = db::totals_between(conn, start, end)?;
    let expenses = totals.expenses();

    let categories = db::expenses_by_category(conn, start, end)?
        .into_iter()
        .map(|(name, value)| CategoryShare {
            share_pct: percent_of(value, expenses),
            name,
            value,
        })
        .collect();

    let (prev_start, prev_end) = period_bounds(previous_period(anchor, period), period)?;
    let previous = db::totals_between(conn, prev_start, prev_end)?;

    Ok(PeriodSummary {
        period,
        start,
        end,
        label: format_period(anchor, period),
        is_current: is_current_period(anchor, period, today),
        expense_change_pct: change_pct(expenses, previous.expenses()),
        totals,
        expenses,
        balance: totals.balance(),
        categories,
        previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{apply_schema, Transaction, TransactionKind};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    fn spend(conn: &Connection, date: NaiveDate, amount: Decimal) {
        let tx = Transaction::new(TransactionKind::DailyExpense, amount, "Padaria", date);
        db::insert_transaction(conn, &tx).unwrap();
    }

    #[test]
    fn test_week_summary_compares_with_previous_week() {
        let conn = memory_db();
        // Week of 06/01/2025 (Monday) to 12/01/2025
        spend(&conn, d(2025, 1, 6), dec!(30));
        spend(&conn, d(2025, 1, 12), dec!(30));
        spend(&conn, d(2025, 1, 13), dec!(500));
        // Previous week
        spend(&conn, d(2024, 12, 31), dec!(40));

        let summary = period_summary(&conn, d(2025, 1, 8), PeriodType::Week, d(2025, 1, 9)).unwrap();
        assert_eq!((summary.start, summary.end), (d(2025, 1, 6), d(2025, 1, 12)));
        assert_eq!(summary.label, "06/01 - 12/01");
        assert!(summary.is_current);
        assert_eq!(summary.expenses, dec!(60));
        assert_eq!(summary.balance, dec!(-60));
        assert_eq!(summary.previous.daily, dec!(40));
        assert_eq!(summary.expense_change_pct, Some(dec!(50.0)));
    }

    #[test]
    fn test_past_day_is_not_current() {
        let conn = memory_db();
        spend(&conn, d(2025, 1, 13), dec!(12.5));

        let summary = period_summary(&conn, d(2025, 1, 13), PeriodType::Day, d(2025, 2, 1)).unwrap();
        assert!(!summary.is_current);
        assert_eq!(summary.label, "13 de janeiro de 2025");
        assert_eq!(summary.expenses, dec!(12.5));
        assert_eq!(summary.expense_change_pct, None);
    }
}
