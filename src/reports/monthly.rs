use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::db::{self, KindTotals, MonthStatus, Transaction, TransactionFilter, TransactionKind};
use crate::periods::{month_bounds, month_name, previous_month};
use crate::utils::{format_currency, format_percent, percent_of};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: Decimal,
    /// Share of the month's expenses, `None` when nothing was spent
    pub share_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthComparison {
    pub previous: KindTotals,
    pub income_change_pct: Option<Decimal>,
    pub expense_change_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub label: String,
    /// `None` when the month was never opened
    pub status: Option<MonthStatus>,
    pub opening_balance: Option<Decimal>,
    pub totals: KindTotals,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub categories: Vec<CategoryShare>,
    pub largest_expense: Option<Transaction>,
    pub largest_income: Option<Transaction>,
    pub comparison: Option<MonthComparison>,
    pub insights: Vec<String>,
}

/// Relative change from `previous` to `current`, in percent
pub fn change_pct(current: Decimal, previous: Decimal) -> Option<Decimal> {
    percent_of(current - previous, previous)
        .map(|p| p.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

pub fn monthly_summary(conn: &Connection, year: i32, month: u32) -> Result<MonthlySummary> {
    let (from, to) = month_bounds(year, month)?;
    let stored = db::get_month(conn, year, month)?;
    let transactions = db::list_transactions(
        conn,
        &TransactionFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        },
    )?;

    let mut totals = KindTotals::default();
    for tx in &transactions {
        totals.add(tx.kind, tx.amount);
    }
    let expenses = totals.expenses();

    let categories = db::expenses_by_category(conn, from, to)?
        .into_iter()
        .map(|(name, value)| CategoryShare {
            share_pct: percent_of(value, expenses),
            name,
            value,
        })
        .collect();

    let largest = |wanted: fn(&TransactionKind) -> bool| {
        transactions
            .iter()
            .filter(|t| wanted(&t.kind))
            .max_by(|a, b| a.amount.cmp(&b.amount))
            .cloned()
    };
    let largest_expense = largest(|k| k.is_expense());
    let largest_income = largest(|k| !k.is_expense());

    let (prev_year, prev_month) = previous_month(year, month);
    let (prev_from, prev_to) = month_bounds(prev_year, prev_month)?;
    let previous = db::totals_between(conn, prev_from, prev_to)?;
    let comparison = (previous != KindTotals::default()).then(|| MonthComparison {
        income_change_pct: change_pct(totals.income, previous.income),
        expense_change_pct: change_pct(expenses, previous.expenses()),
        previous,
    });

    let mut summary = MonthlySummary {
        year,
        month,
        label: format!("{} de {}", month_name(month), year),
        status: stored.as_ref().map(|m| m.status),
        opening_balance: stored.as_ref().map(|m| m.opening_balance),
        totals,
        expenses,
        balance: totals.balance(),
        transaction_count: transactions.len(),
        categories,
        largest_expense,
        largest_income,
        comparison,
        insights: Vec::new(),
    };
    summary.insights = monthly_insights(&summary);
    Ok(summary)
}

fn monthly_insights(summary: &MonthlySummary) -> Vec<String> {
    let mut insights = Vec::new();
    if summary.transaction_count == 0 {
        insights.push("Nenhuma transação registrada neste mês".to_string());
        return insights;
    }

    if summary.balance < Decimal::ZERO {
        insights.push(format!(
            "⚠️ Você gastou {} a mais do que recebeu",
            format_currency(-summary.balance)
        ));
    } else if let Some(rate) = percent_of(summary.balance, summary.totals.income) {
        insights.push(format!("💰 Você guardou {} da renda", format_percent(rate)));
    }

    if let Some(top) = summary.categories.first() {
        if let Some(share) = top.share_pct {
            insights.push(format!(
                "📊 {} concentra {} dos gastos",
                top.name,
                format_percent(share)
            ));
        }
    }

    if let Some(change) = summary.comparison.as_ref().and_then(|c| c.expense_change_pct) {
        if change > Decimal::ZERO {
            insights.push(format!("📈 Gastos {} maiores que no mês anterior", format_percent(change)));
        } else if change < Decimal::ZERO {
            insights.push(format!("📉 Gastos {} menores que no mês anterior", format_percent(-change)));
        }
    }

    insights
}
