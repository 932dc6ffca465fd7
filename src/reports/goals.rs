use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculators::round_cents;
use crate::calculators::projections::SPEND_ALERT_PCT;
use crate::db::{self, FinancialGoal, MonthlyGoal, MonthlyGoalType, TransactionFilter};
use crate::periods::{month_bounds, months_until, parse_month_ref};
use crate::utils::percent_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    OnTrack,
    /// Spending cap above 80% used
    Warning,
    Exceeded,
    Achieved,
    Behind,
}

impl GoalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::OnTrack => "No caminho",
            GoalStatus::Warning => "Atenção",
            GoalStatus::Exceeded => "Estourou",
            GoalStatus::Achieved => "Atingida",
            GoalStatus::Behind => "Abaixo",
        }
    }
}

/// Progress clamped to 0..=100
fn clamped_percent(current: Decimal, target: Decimal) -> Decimal {
    percent_of(current, target)
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .round_dp(1)
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyGoalProgress {
    pub goal: MonthlyGoal,
    pub category_name: Option<String>,
    /// Amount spent (spending cap) or saved (savings floor) so far
    pub current: Decimal,
    pub percent: Decimal,
    pub remaining: Decimal,
    pub status: GoalStatus,
}

fn spent_in(conn: &Connection, from: NaiveDate, to: NaiveDate, category_id: Option<i64>) -> Result<Decimal> {
    let txs = db::list_transactions(
        conn,
        &TransactionFilter {
            from: Some(from),
            to: Some(to),
            category_id,
            ..Default::default()
        },
    )?;
    Ok(txs.iter().filter(|t| t.kind.is_expense()).map(|t| t.amount).sum())
}

pub fn monthly_goal_progress(conn: &Connection, month_ref: &str) -> Result<Vec<MonthlyGoalProgress>> {
    let (year, month) = parse_month_ref(month_ref)?;
    let (from, to) = month_bounds(year, month)?;
    let categories = db::list_categories(conn)?;

    db::list_monthly_goals(conn, month_ref)?
        .into_iter()
        .map(|goal| {
            let category_name = goal
                .category_id
                .and_then(|id| categories.iter().find(|c| c.id == Some(id)))
                .map(|c| c.name.clone());

            let (current, status) = match goal.goal_type {
                MonthlyGoalType::MaxSpending => {
                    let spent = spent_in(conn, from, to, goal.category_id)?;
                    let used = percent_of(spent, goal.target).unwrap_or(Decimal::ZERO);
                    let status = if spent > goal.target {
                        GoalStatus::Exceeded
                    } else if used > SPEND_ALERT_PCT {
                        GoalStatus::Warning
                    } else {
                        GoalStatus::OnTrack
                    };
                    (spent, status)
                }
                MonthlyGoalType::MinSavings => {
                    let saved = db::totals_between(conn, from, to)?.balance();
                    let status = if saved >= goal.target {
                        GoalStatus::Achieved
                    } else {
                        GoalStatus::Behind
                    };
                    (saved, status)
                }
            };

            Ok(MonthlyGoalProgress {
                percent: clamped_percent(current, goal.target),
                remaining: (goal.target - current).max(Decimal::ZERO),
                category_name,
                current,
                status,
                goal,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialGoalProgress {
    pub goal: FinancialGoal,
    pub percent: Decimal,
    pub remaining: Decimal,
    pub months_left: Option<u32>,
    /// Monthly contribution that reaches the target by the deadline
    pub suggested_monthly: Option<Decimal>,
    pub completed: bool,
}

pub fn financial_goal_progress(goal: FinancialGoal, today: NaiveDate) -> FinancialGoalProgress {
    let remaining = (goal.target - goal.current).max(Decimal::ZERO);
    let months_left = goal.deadline.map(|deadline| months_until(today, deadline));
    let suggested_monthly = match months_left {
        Some(months) if remaining > Decimal::ZERO => Some(round_cents(remaining / Decimal::from(months))),
        _ => None,
    };

    FinancialGoalProgress {
        percent: clamped_percent(goal.current, goal.target),
        completed: remaining.is_zero(),
        remaining,
        months_left,
        suggested_monthly,
        goal,
    }
}

pub fn all_financial_goal_progress(conn: &Connection, today: NaiveDate) -> Result<Vec<FinancialGoalProgress>> {
    Ok(db::list_financial_goals(conn)?
        .into_iter()
        .map(|goal| financial_goal_progress(goal, today))
        .collect())
}
