// Database module - SQLite connection, schema and queries

pub mod assets;
pub mod cards;
pub mod goals;
pub mod ledger;
pub mod models;
pub mod planning;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

pub use assets::*;
pub use cards::*;
pub use goals::*;
pub use ledger::*;
pub use models::{
    Account, Asset, AssetType, Card, CardType, Category, CategoryKind, ChatMessage, ChatRole, FinancialGoal,
    FinancialGoalType, FinancialMonth, FinancingStatus, GoalContribution, Installment, InstallmentPurchase,
    Invoice, MonthStatus, MonthlyGoal, MonthlyGoalType, SavedProjection, Simulation, Transaction,
    TransactionKind,
};
pub use planning::*;

/// Default categories seeded on init: (name, icon, color, kind)
pub const DEFAULT_CATEGORIES: [(&str, &str, &str, CategoryKind); 16] = [
    ("Alimentação", "🍕", "#EF4444", CategoryKind::Variable),
    ("Transporte", "🚗", "#3B82F6", CategoryKind::Variable),
    ("Moradia", "🏠", "#8B5CF6", CategoryKind::Fixed),
    ("Diversão", "🎮", "#EC4899", CategoryKind::Variable),
    ("Saúde/Beleza", "💆", "#10B981", CategoryKind::Variable),
    ("Roupas/Acessórios", "👗", "#F59E0B", CategoryKind::Variable),
    ("Educação", "📚", "#6366F1", CategoryKind::Fixed),
    ("Setup/Equipamentos", "💻", "#06B6D4", CategoryKind::Variable),
    ("Assinaturas", "📱", "#F97316", CategoryKind::Fixed),
    ("Investimentos", "📈", "#14B8A6", CategoryKind::Fixed),
    ("Seguros", "🛡️", "#64748B", CategoryKind::Fixed),
    ("Viagens", "✈️", "#0EA5E9", CategoryKind::Variable),
    ("Pets", "🐾", "#84CC16", CategoryKind::Variable),
    ("Restaurante", "🍽️", "#DC2626", CategoryKind::Variable),
    ("Academia/Esportes", "🏋️", "#059669", CategoryKind::Fixed),
    ("Outro", "❓", "#6B7280", CategoryKind::Variable),
];

/// Get the default database path (~/.financetrack/data.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let data_dir = PathBuf::from(home).join(".financetrack");

    std::fs::create_dir_all(&data_dir).context("Failed to create .financetrack directory")?;

    Ok(data_dir.join("data.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(path) => path,
        None => get_default_db_path()?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Initialize the database with schema and default categories.
///
/// Safe to run repeatedly: every statement is `IF NOT EXISTS` and the
/// category seed ignores names that already exist.
pub fn init_database(db_path: Option<PathBuf>) -> Result<()> {
    let path = match db_path {
        Some(path) => path,
        None => get_default_db_path()?,
    };

    info!("Initializing database at: {:?}", path);

    let conn = open_db(Some(path))?;
    apply_schema(&conn)?;

    info!("Database initialized successfully");
    Ok(())
}

/// Run the embedded schema and seed defaults on an open connection
pub fn apply_schema(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    conn.execute_batch(schema_sql)
        .context("Failed to execute schema")?;
    let seeded = seed_default_categories(conn)?;
    debug!("Seeded {} default categories", seeded);
    Ok(())
}

/// Insert the default categories that are missing. Returns how many were added.
pub fn seed_default_categories(conn: &Connection) -> Result<usize> {
    let mut inserted = 0;
    for (name, icon, color, kind) in DEFAULT_CATEGORIES {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO categories (name, icon, color, kind, is_default)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![name, icon, color, kind.as_str()],
        )?;
    }
    Ok(inserted)
}

/// Read a setting value
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Insert or replace a setting value
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        params![key, value],
    )?;
    Ok(())
}

/// Helper to read Decimal from SQLite (stored as TEXT)
pub fn get_decimal_value(row: &rusqlite::Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))?;
            Decimal::from_str(s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
            })
        }
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => Decimal::try_from(f).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Real, Box::new(e))
        }),
        _ => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            rusqlite::types::Type::Null,
        )),
    }
}

/// Helper to read optional Decimal from SQLite
pub fn get_optional_decimal_value(
    row: &rusqlite::Row,
    idx: usize,
) -> Result<Option<Decimal>, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        _ => get_decimal_value(row, idx).map(Some),
    }
}

/// Parse a stored enum column, reporting the column index on failure
pub(crate) fn parse_enum<T: FromStr>(value: &str, idx: usize) -> Result<T, rusqlite::Error> {
    value.parse::<T>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unexpected value '{}'", value).into(),
        )
    })
}
