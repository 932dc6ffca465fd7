use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use super::monthly::change_pct;
use crate::db::{self, KindTotals};
use crate::error::invalid;
use crate::periods::month_bounds;

#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnualSummary {
    pub year: i32,
    /// Months with at least one transaction, in calendar order
    pub months: Vec<MonthRow>,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub previous_year: KindTotals,
    pub income_change_pct: Option<Decimal>,
    pub expense_change_pct: Option<Decimal>,
    pub top_categories: Vec<(String, Decimal)>,
}

fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| invalid(format!("invalid year {}", year)))?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| invalid(format!("invalid year {}", year)))?;
    Ok((first, last))
}

pub fn annual_summary(conn: &Connection, year: i32, top: usize) -> Result<AnnualSummary> {
    let mut months = Vec::new();
    let mut totals = KindTotals::default();

    for month in 1..=12 {
        let (from, to) = month_bounds(year, month)?;
        let month_totals = db::totals_between(conn, from, to)?;
        if month_totals == KindTotals::default() {
            continue;
        }
        totals.income += month_totals.income;
        totals.fixed += month_totals.fixed;
        totals.daily += month_totals.daily;
        months.push(MonthRow {
            month,
            income: month_totals.income,
            expenses: month_totals.expenses(),
            balance: month_totals.balance(),
        });
    }

    let (from, to) = year_bounds(year)?;
    let (prev_from, prev_to) = year_bounds(year - 1)?;
    let previous_year = db::totals_between(conn, prev_from, prev_to)?;

    let mut top_categories = db::expenses_by_category(conn, from, to)?;
    top_categories.truncate(top);

    Ok(AnnualSummary {
        year,
        months,
        income: totals.income,
        expenses: totals.expenses(),
        balance: totals.balance(),
        income_change_pct: change_pct(totals.income, previous_year.income),
        expense_change_pct: change_pct(totals.expenses(), previous_year.expenses()),
        previous_year,
        top_categories,
    })
}
