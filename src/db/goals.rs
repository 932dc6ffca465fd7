//! Monthly goals (spending caps / savings floors) and long-term financial goals

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::info;

use super::models::{FinancialGoal, GoalContribution, MonthlyGoal};
use super::{get_decimal_value, parse_enum};
use crate::error::FinanceError;

pub fn insert_monthly_goal(conn: &Connection, goal: &MonthlyGoal) -> Result<i64> {
    crate::periods::parse_month_ref(&goal.month_ref)?;
    if goal.target <= Decimal::ZERO {
        return Err(crate::error::invalid("goal target must be positive"));
    }
    conn.execute(
        "INSERT INTO monthly_goals (month_ref, goal_type, target, category_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            goal.month_ref,
            goal.goal_type.as_str(),
            goal.target.to_string(),
            goal.category_id
        ],
    )
    .context("Failed to create monthly goal")?;
    Ok(conn.last_insert_rowid())
}

fn monthly_goal_from_row(row: &Row) -> Result<MonthlyGoal, rusqlite::Error> {
    let goal_type: String = row.get(2)?;
    Ok(MonthlyGoal {
        id: Some(row.get(0)?),
        month_ref: row.get(1)?,
        goal_type: parse_enum(&goal_type, 2)?,
        target: get_decimal_value(row, 3)?,
        category_id: row.get(4)?,
    })
}

pub fn list_monthly_goals(conn: &Connection, month_ref: &str) -> Result<Vec<MonthlyGoal>> {
    let mut stmt = conn.prepare(
        "SELECT id, month_ref, goal_type, target, category_id
         FROM monthly_goals WHERE month_ref = ?1 ORDER BY id",
    )?;
    let goals = stmt
        .query_map(params![month_ref], monthly_goal_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(goals)
}

pub fn delete_monthly_goal(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn.execute("DELETE FROM monthly_goals WHERE id = ?1", params![id])? > 0)
}

// ---------------------------------------------------------------------------
// Financial goals

pub fn insert_financial_goal(conn: &Connection, goal: &FinancialGoal) -> Result<i64> {
    if goal.target <= Decimal::ZERO {
        return Err(crate::error::invalid("goal target must be positive"));
    }
    conn.execute(
        "INSERT INTO financial_goals (name, goal_type, target, current, deadline)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            goal.name,
            goal.goal_type.as_str(),
            goal.target.to_string(),
            goal.current.to_string(),
            goal.deadline
        ],
    )
    .with_context(|| format!("Failed to create goal '{}'", goal.name))?;
    Ok(conn.last_insert_rowid())
}

fn financial_goal_from_row(row: &Row) -> Result<FinancialGoal, rusqlite::Error> {
    let goal_type: String = row.get(2)?;
    Ok(FinancialGoal {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        goal_type: parse_enum(&goal_type, 2)?,
        target: get_decimal_value(row, 3)?,
        current: get_decimal_value(row, 4)?,
        deadline: row.get(5)?,
    })
}

pub fn list_financial_goals(conn: &Connection) -> Result<Vec<FinancialGoal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, goal_type, target, current, deadline
         FROM financial_goals ORDER BY deadline IS NULL, deadline, id",
    )?;
    let goals = stmt
        .query_map([], financial_goal_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(goals)
}

pub fn get_financial_goal(conn: &Connection, id: i64) -> Result<Option<FinancialGoal>> {
    Ok(conn
        .query_row(
            "SELECT id, name, goal_type, target, current, deadline FROM financial_goals WHERE id = ?1",
            params![id],
            financial_goal_from_row,
        )
        .optional()?)
}

/// Record a contribution and add it to the goal's current amount.
/// Negative amounts are withdrawals; the current amount never drops below zero.
pub fn add_goal_contribution(
    conn: &Connection,
    goal_id: i64,
    amount: Decimal,
    date: NaiveDate,
    note: Option<&str>,
) -> Result<FinancialGoal> {
    let goal = get_financial_goal(conn, goal_id)?
        .ok_or_else(|| FinanceError::NotFound(format!("goal {}", goal_id)))?;
    if amount.is_zero() {
        return Err(crate::error::invalid("contribution amount cannot be zero"));
    }
    let new_current = (goal.current + amount).max(Decimal::ZERO);

    let db_tx = conn.unchecked_transaction()?;
    db_tx.execute(
        "INSERT INTO goal_contributions (goal_id, amount, date, note) VALUES (?1, ?2, ?3, ?4)",
        params![goal_id, amount.to_string(), date, note],
    )?;
    db_tx.execute(
        "UPDATE financial_goals SET current = ?1 WHERE id = ?2",
        params![new_current.to_string(), goal_id],
    )?;
    db_tx.commit()?;

    info!("Goal '{}' now at {} of {}", goal.name, new_current, goal.target);
    get_financial_goal(conn, goal_id)?
        .ok_or_else(|| FinanceError::NotFound(format!("goal {}", goal_id)).into())
}

pub fn list_goal_contributions(conn: &Connection, goal_id: i64) -> Result<Vec<GoalContribution>> {
    let mut stmt = conn.prepare(
        "SELECT id, goal_id, amount, date, note FROM goal_contributions
         WHERE goal_id = ?1 ORDER BY date, id",
    )?;
    let items = stmt
        .query_map(params![goal_id], |row| {
            Ok(GoalContribution {
                id: row.get(0)?,
                goal_id: row.get(1)?,
                amount: get_decimal_value(row, 2)?,
                date: row.get(3)?,
                note: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

pub fn delete_financial_goal(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn.execute("DELETE FROM financial_goals WHERE id = ?1", params![id])? > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{apply_schema, FinancialGoalType, MonthlyGoalType};
    use rust_decimal_macros::dec;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_monthly_goal_requires_valid_month_ref() {
        let conn = memory_db();
        let mut goal = MonthlyGoal {
            id: None,
            month_ref: "2025-1".to_string(),
            goal_type: MonthlyGoalType::MaxSpending,
            target: dec!(500),
            category_id: None,
        };
        assert!(insert_monthly_goal(&conn, &goal).is_err());
        goal.month_ref = "2025-01".to_string();
        insert_monthly_goal(&conn, &goal).unwrap();
        assert_eq!(list_monthly_goals(&conn, "2025-01").unwrap().len(), 1);
        assert!(list_monthly_goals(&conn, "2025-02").unwrap().is_empty());
    }

    #[test]
    fn test_contributions_update_current_and_floor_at_zero() {
        let conn = memory_db();
        let id = insert_financial_goal(
            &conn,
            &FinancialGoal {
                id: None,
                name: "Reserva".to_string(),
                goal_type: FinancialGoalType::EmergencyFund,
                target: dec!(10000),
                current: dec!(1000),
                deadline: None,
            },
        )
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let goal = add_goal_contribution(&conn, id, dec!(500), today, Some("bônus")).unwrap();
        assert_eq!(goal.current, dec!(1500));

        let goal = add_goal_contribution(&conn, id, dec!(-2000), today, None).unwrap();
        assert_eq!(goal.current, dec!(0));

        assert_eq!(list_goal_contributions(&conn, id).unwrap().len(), 2);
        assert!(add_goal_contribution(&conn, 999, dec!(1), today, None).is_err());
    }
}
