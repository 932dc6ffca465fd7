//! Accounts, categories, financial months and transactions

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::models::{
    Account, Category, CategoryKind, FinancialMonth, MonthStatus, Transaction, TransactionKind,
};
use super::{get_decimal_value, get_optional_decimal_value, parse_enum};
use crate::error::FinanceError;
use crate::utils::fold_text;

// ---------------------------------------------------------------------------
// Accounts

pub fn insert_account(
    conn: &Connection,
    name: &str,
    bank: Option<&str>,
    balance: Decimal,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts (name, bank, balance) VALUES (?1, ?2, ?3)",
        params![name, bank, balance.to_string()],
    )
    .with_context(|| format!("Failed to create account '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

fn account_from_row(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        bank: row.get(2)?,
        balance: get_decimal_value(row, 3)?,
        active: row.get(4)?,
    })
}

pub fn list_accounts(conn: &Connection, include_inactive: bool) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, bank, balance, active FROM accounts
         WHERE active = 1 OR ?1
         ORDER BY name",
    )?;
    let accounts = stmt
        .query_map(params![include_inactive], account_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn get_account_by_name(conn: &Connection, name: &str) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            "SELECT id, name, bank, balance, active FROM accounts WHERE name = ?1 COLLATE NOCASE",
            params![name],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

pub fn get_account(conn: &Connection, id: i64) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            "SELECT id, name, bank, balance, active FROM accounts WHERE id = ?1",
            params![id],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

/// Add `delta` to an account balance
pub fn adjust_account_balance(conn: &Connection, account_id: i64, delta: Decimal) -> Result<()> {
    let account = get_account(conn, account_id)?
        .ok_or_else(|| FinanceError::NotFound(format!("account {}", account_id)))?;
    let new_balance = account.balance + delta;
    conn.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![new_balance.to_string(), account_id],
    )?;
    Ok(())
}

pub fn set_account_active(conn: &Connection, account_id: i64, active: bool) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE accounts SET active = ?1 WHERE id = ?2",
        params![active, account_id],
    )?;
    Ok(changed > 0)
}

/// Sum of balances of active accounts
pub fn total_active_balance(conn: &Connection) -> Result<Decimal> {
    Ok(list_accounts(conn, false)?
        .iter()
        .map(|a| a.balance)
        .sum())
}

// ---------------------------------------------------------------------------
// Categories

fn category_from_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let kind: String = row.get(4)?;
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        icon: row.get(2)?,
        color: row.get(3)?,
        kind: parse_enum(&kind, 4)?,
        is_default: row.get(5)?,
    })
}

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, icon, color, kind, is_default FROM categories ORDER BY is_default DESC, id",
    )?;
    let categories = stmt
        .query_map([], category_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn insert_category(
    conn: &Connection,
    name: &str,
    icon: &str,
    color: &str,
    kind: CategoryKind,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories (name, icon, color, kind) VALUES (?1, ?2, ?3, ?4)",
        params![name, icon, color, kind.as_str()],
    )
    .with_context(|| format!("Failed to create category '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

/// Find a category by name, ignoring case and accents ("alimentacao" finds "Alimentação")
pub fn find_category(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let wanted = fold_text(name.trim());
    Ok(list_categories(conn)?
        .into_iter()
        .find(|c| fold_text(&c.name) == wanted))
}

// ---------------------------------------------------------------------------
// Financial months

const MONTH_COLUMNS: &str = "id, year, month, status, opening_balance, closing_balance,
    total_income, total_fixed, total_daily";

fn month_from_row(row: &Row) -> Result<FinancialMonth, rusqlite::Error> {
    let status: String = row.get(3)?;
    Ok(FinancialMonth {
        id: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        status: parse_enum::<MonthStatus>(&status, 3)?,
        opening_balance: get_decimal_value(row, 4)?,
        closing_balance: get_optional_decimal_value(row, 5)?,
        total_income: get_optional_decimal_value(row, 6)?,
        total_fixed: get_optional_decimal_value(row, 7)?,
        total_daily: get_optional_decimal_value(row, 8)?,
    })
}

pub fn get_month(conn: &Connection, year: i32, month: u32) -> Result<Option<FinancialMonth>> {
    let sql = format!(
        "SELECT {} FROM financial_months WHERE year = ?1 AND month = ?2",
        MONTH_COLUMNS
    );
    let found = conn
        .query_row(&sql, params![year, month], month_from_row)
        .optional()?;
    Ok(found)
}

/// Return the financial month, creating it when missing.
///
/// A new month starts `aberto` with an opening balance equal to the sum of
/// the active account balances. The flag tells whether it was created.
pub fn ensure_month_exists(
    conn: &Connection,
    year: i32,
    month: u32,
) -> Result<(FinancialMonth, bool)> {
    if !(1..=12).contains(&month) {
        return Err(crate::error::invalid(format!("invalid month {}", month)));
    }
    if let Some(existing) = get_month(conn, year, month)? {
        return Ok((existing, false));
    }

    let opening = total_active_balance(conn)?;
    conn.execute(
        "INSERT INTO financial_months (year, month, status, opening_balance)
         VALUES (?1, ?2, 'aberto', ?3)",
        params![year, month, opening.to_string()],
    )?;
    info!("Created financial month {:02}/{} (opening {})", month, year, opening);

    let created = get_month(conn, year, month)?
        .ok_or_else(|| FinanceError::DbError("month vanished after insert".into()))?;
    Ok((created, true))
}

/// Most recent months first
pub fn list_months(conn: &Connection, limit: usize) -> Result<Vec<FinancialMonth>> {
    let sql = format!(
        "SELECT {} FROM financial_months ORDER BY year DESC, month DESC LIMIT ?1",
        MONTH_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let months = stmt
        .query_map(params![limit as i64], month_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(months)
}

/// Income, fixed and daily totals for a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTotals {
    pub income: Decimal,
    pub fixed: Decimal,
    pub daily: Decimal,
}

impl KindTotals {
    pub fn expenses(&self) -> Decimal {
        self.fixed + self.daily
    }

    pub fn balance(&self) -> Decimal {
        self.income - self.expenses()
    }

    pub fn add(&mut self, kind: TransactionKind, amount: Decimal) {
        match kind {
            TransactionKind::Income => self.income += amount,
            TransactionKind::FixedExpense => self.fixed += amount,
            TransactionKind::DailyExpense => self.daily += amount,
        }
    }
}

/// Totals of non-deleted transactions dated within `[from, to]`
pub fn totals_between(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<KindTotals> {
    let mut stmt = conn.prepare(
        "SELECT kind, amount FROM transactions
         WHERE deleted = 0 AND date >= ?1 AND date <= ?2",
    )?;
    let mut rows = stmt.query(params![from, to])?;
    let mut totals = KindTotals::default();
    while let Some(row) = rows.next()? {
        let kind: String = row.get(0)?;
        let amount = get_decimal_value(row, 1).context("Failed to parse transaction amount")?;
        totals.add(parse_enum(&kind, 0)?, amount);
    }
    Ok(totals)
}

/// Totals of the transactions attached to a financial month
pub fn month_totals(conn: &Connection, month_id: i64) -> Result<KindTotals> {
    let mut stmt = conn.prepare(
        "SELECT kind, amount FROM transactions WHERE deleted = 0 AND month_id = ?1",
    )?;
    let mut rows = stmt.query(params![month_id])?;
    let mut totals = KindTotals::default();
    while let Some(row) = rows.next()? {
        let kind: String = row.get(0)?;
        let amount = get_decimal_value(row, 1).context("Failed to parse transaction amount")?;
        totals.add(parse_enum(&kind, 0)?, amount);
    }
    Ok(totals)
}

/// Close a month: store totals and the closing balance, mark it `fechado`
pub fn close_month(conn: &Connection, year: i32, month: u32) -> Result<FinancialMonth> {
    let existing = get_month(conn, year, month)?.ok_or_else(|| {
        FinanceError::NotFound(format!("financial month {:02}/{}", month, year))
    })?;
    let totals = month_totals(conn, existing.id)?;
    let closing = existing.opening_balance + totals.balance();

    conn.execute(
        "UPDATE financial_months
         SET status = 'fechado', closing_balance = ?1, total_income = ?2,
             total_fixed = ?3, total_daily = ?4, closed_at = CURRENT_TIMESTAMP
         WHERE id = ?5",
        params![
            closing.to_string(),
            totals.income.to_string(),
            totals.fixed.to_string(),
            totals.daily.to_string(),
            existing.id
        ],
    )?;
    info!("Closed financial month {:02}/{} with balance {}", month, year, closing);

    get_month(conn, year, month)?
        .ok_or_else(|| FinanceError::DbError("month vanished after close".into()).into())
}

// ---------------------------------------------------------------------------
// Transactions

const TX_COLUMNS: &str = "t.id, t.month_id, t.kind, t.amount, t.description, t.date,
    t.category_id, t.account_id, t.card_id, t.source, t.fingerprint, c.name";

fn transaction_from_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let kind: String = row.get(2)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        month_id: row.get(1)?,
        kind: parse_enum(&kind, 2)?,
        amount: get_decimal_value(row, 3)?,
        description: row.get(4)?,
        date: row.get(5)?,
        category_id: row.get(6)?,
        account_id: row.get(7)?,
        card_id: row.get(8)?,
        source: row.get(9)?,
        fingerprint: row.get(10)?,
        category_name: row.get(11)?,
    })
}

/// Insert a transaction into the financial month of its date.
///
/// The month is created on demand; a linked account has its balance adjusted.
pub fn insert_transaction(conn: &Connection, tx: &Transaction) -> Result<i64> {
    if tx.amount <= Decimal::ZERO {
        return Err(crate::error::invalid("transaction amount must be positive"));
    }
    if tx.description.trim().is_empty() {
        return Err(crate::error::invalid("transaction description is required"));
    }

    let db_tx = conn.unchecked_transaction()?;
    let (month, _) = ensure_month_exists(&db_tx, tx.date.year(), tx.date.month())?;
    if month.status == MonthStatus::Closed {
        warn!(
            "Adding transaction to closed month {:02}/{}",
            month.month, month.year
        );
    }

    db_tx.execute(
        "INSERT INTO transactions (
            month_id, kind, amount, description, date,
            category_id, account_id, card_id, source, fingerprint
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            month.id,
            tx.kind.as_str(),
            tx.amount.to_string(),
            tx.description.trim(),
            tx.date,
            tx.category_id,
            tx.account_id,
            tx.card_id,
            tx.source,
            tx.fingerprint,
        ],
    )?;
    let id = db_tx.last_insert_rowid();

    if let Some(account_id) = tx.account_id {
        adjust_account_balance(&db_tx, account_id, tx.kind.signed(tx.amount))?;
    }

    db_tx.commit()?;
    Ok(id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id
         WHERE t.id = ?1 AND t.deleted = 0",
        TX_COLUMNS
    );
    let tx = conn
        .query_row(&sql, params![id], transaction_from_row)
        .optional()?;
    Ok(tx)
}

/// Soft-delete a transaction and reverse its effect on the linked account.
/// Returns false when the id does not exist or is already deleted.
pub fn soft_delete_transaction(conn: &Connection, id: i64) -> Result<bool> {
    let Some(tx) = get_transaction(conn, id)? else {
        return Ok(false);
    };

    let db_tx = conn.unchecked_transaction()?;
    db_tx.execute("UPDATE transactions SET deleted = 1 WHERE id = ?1", params![id])?;
    if let Some(account_id) = tx.account_id {
        adjust_account_balance(&db_tx, account_id, -tx.kind.signed(tx.amount))?;
    }
    db_tx.commit()?;
    Ok(true)
}

/// Filters for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<i64>,
    pub card_id: Option<i64>,
    pub limit: Option<usize>,
}

/// List non-deleted transactions, newest first
pub fn list_transactions(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id
         WHERE t.deleted = 0
           AND (?1 IS NULL OR t.date >= ?1)
           AND (?2 IS NULL OR t.date <= ?2)
           AND (?3 IS NULL OR t.kind = ?3)
           AND (?4 IS NULL OR t.category_id = ?4)
           AND (?5 IS NULL OR t.card_id = ?5)
         ORDER BY t.date DESC, t.id DESC
         LIMIT ?6",
        TX_COLUMNS
    );
    let limit = filter.limit.map(|l| l as i64).unwrap_or(-1);
    let mut stmt = conn.prepare(&sql)?;
    let txs = stmt
        .query_map(
            params![
                filter.from,
                filter.to,
                filter.kind.map(|k| k.as_str()),
                filter.category_id,
                filter.card_id,
                limit
            ],
            transaction_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(txs)
}

/// True when a live transaction already carries this import fingerprint
pub fn fingerprint_exists(conn: &Connection, fingerprint: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM transactions WHERE fingerprint = ?1 AND deleted = 0 LIMIT 1",
            params![fingerprint],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Expense totals per category within `[from, to]`, largest first.
/// Uncategorized expenses are reported under "Outro".
pub fn expenses_by_category(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(String, Decimal)>> {
    let mut stmt = conn.prepare(
        "SELECT COALESCE(c.name, 'Outro'), t.amount
         FROM transactions t LEFT JOIN categories c ON c.id = t.category_id
         WHERE t.deleted = 0 AND t.kind != 'entrada' AND t.date >= ?1 AND t.date <= ?2",
    )?;
    let mut rows = stmt.query(params![from, to])?;
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(0)?;
        let amount = get_decimal_value(row, 1)?;
        match totals.iter_mut().find(|(n, _)| *n == name) {
            Some((_, total)) => *total += amount,
            None => totals.push((name, amount)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::apply_schema;
    use rust_decimal_macros::dec;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        conn
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_month_opens_with_sum_of_active_accounts() {
        let conn = memory_db();
        insert_account(&conn, "Nubank", None, dec!(1500.50)).unwrap();
        let closed = insert_account(&conn, "Antiga", None, dec!(999)).unwrap();
        set_account_active(&conn, closed, false).unwrap();
        insert_account(&conn, "Itaú", Some("Itaú"), dec!(500)).unwrap();

        let (month, created) = ensure_month_exists(&conn, 2025, 3).unwrap();
        assert!(created);
        assert_eq!(month.status, MonthStatus::Open);
        assert_eq!(month.opening_balance, dec!(2000.50));

        let (again, created) = ensure_month_exists(&conn, 2025, 3).unwrap();
        assert!(!created);
        assert_eq!(again.id, month.id);
    }

    #[test]
    fn test_ensure_month_rejects_month_thirteen() {
        let conn = memory_db();
        assert!(ensure_month_exists(&conn, 2025, 13).is_err());
    }

    #[test]
    fn test_insert_and_soft_delete_adjust_account_balance() {
        let conn = memory_db();
        let account = insert_account(&conn, "Conta", None, dec!(100)).unwrap();

        let mut salary = Transaction::new(TransactionKind::Income, dec!(1000), "Salário", date(2025, 1, 5));
        salary.account_id = Some(account);
        insert_transaction(&conn, &salary).unwrap();

        let mut lunch = Transaction::new(TransactionKind::DailyExpense, dec!(35.90), "Almoço", date(2025, 1, 6));
        lunch.account_id = Some(account);
        let lunch_id = insert_transaction(&conn, &lunch).unwrap();

        assert_eq!(get_account(&conn, account).unwrap().unwrap().balance, dec!(1064.10));

        assert!(soft_delete_transaction(&conn, lunch_id).unwrap());
        assert_eq!(get_account(&conn, account).unwrap().unwrap().balance, dec!(1100));
        assert!(!soft_delete_transaction(&conn, lunch_id).unwrap());
        assert!(get_transaction(&conn, lunch_id).unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_non_positive_amount() {
        let conn = memory_db();
        let tx = Transaction::new(TransactionKind::DailyExpense, dec!(0), "Nada", date(2025, 1, 1));
        assert!(insert_transaction(&conn, &tx).is_err());
    }

    #[test]
    fn test_close_month_stores_totals() {
        let conn = memory_db();
        insert_account(&conn, "Conta", None, dec!(200)).unwrap();
        ensure_month_exists(&conn, 2025, 2).unwrap();

        for (kind, amount) in [
            (TransactionKind::Income, dec!(3000)),
            (TransactionKind::FixedExpense, dec!(1200)),
            (TransactionKind::DailyExpense, dec!(300)),
        ] {
            insert_transaction(&conn, &Transaction::new(kind, amount, "x", date(2025, 2, 10))).unwrap();
        }

        let closed = close_month(&conn, 2025, 2).unwrap();
        assert_eq!(closed.status, MonthStatus::Closed);
        assert_eq!(closed.total_income, Some(dec!(3000)));
        assert_eq!(closed.total_fixed, Some(dec!(1200)));
        assert_eq!(closed.total_daily, Some(dec!(300)));
        assert_eq!(closed.closing_balance, Some(dec!(1700)));
    }

    #[test]
    fn test_list_transactions_filters_and_category_names() {
        let conn = memory_db();
        let food = find_category(&conn, "alimentacao").unwrap().unwrap();

        let mut tx = Transaction::new(TransactionKind::DailyExpense, dec!(50), "Mercado", date(2025, 4, 2));
        tx.category_id = food.id;
        insert_transaction(&conn, &tx).unwrap();
        insert_transaction(
            &conn,
            &Transaction::new(TransactionKind::Income, dec!(10), "Pix recebido", date(2025, 5, 1)),
        )
        .unwrap();

        let april = list_transactions(
            &conn,
            &TransactionFilter {
                from: Some(date(2025, 4, 1)),
                to: Some(date(2025, 4, 30)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(april.len(), 1);
        assert_eq!(april[0].category_name.as_deref(), Some("Alimentação"));

        let incomes = list_transactions(
            &conn,
            &TransactionFilter {
                kind: Some(TransactionKind::Income),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(incomes.len(), 1);

        let by_cat = expenses_by_category(&conn, date(2025, 1, 1), date(2025, 12, 31)).unwrap();
        assert_eq!(by_cat, vec![("Alimentação".to_string(), dec!(50))]);
    }
}
