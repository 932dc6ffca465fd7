//! Command dispatcher that routes parsed clap `Commands` to their handlers.
//!
//! The same entry point serves one-shot CLI invocations and lines typed in
//! the interactive REPL.

mod assets;
mod assistant;
mod cards;
mod goals;
mod imports;
mod ledger;
mod planning;
mod reports;
mod tools;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use colored::Colorize;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cli::Commands;
use financetrack::config::AppConfig;
use financetrack::db::{self, Account, Card, Category};
use financetrack::error::{invalid, FinanceError};
use financetrack::importers::{parse_amount, parse_date};
use financetrack::periods::parse_month_ref;

/// Route a parsed command to its handler
pub async fn dispatch_command(command: Commands, json_output: bool) -> Result<()> {
    match command {
        Commands::Init => dispatch_init(json_output),
        Commands::Import {
            file,
            dry_run,
            account,
            assistant,
        } => imports::dispatch_import(&file, dry_run, account.as_deref(), assistant, json_output).await,
        Commands::Analyze { file, assistant } => imports::dispatch_analyze(&file, assistant, json_output).await,
        Commands::Transactions { action } => ledger::dispatch_transactions(action, json_output),
        Commands::Accounts { action } => ledger::dispatch_accounts(action, json_output),
        Commands::Categories { action } => ledger::dispatch_categories(action, json_output),
        Commands::Month { action } => ledger::dispatch_month(action, json_output),
        Commands::Cards { action } => cards::dispatch_cards(action, json_output),
        Commands::Invoices { action } => cards::dispatch_invoices(action, json_output),
        Commands::Installments { action } => cards::dispatch_installments(action, json_output),
        Commands::Goals { action } => goals::dispatch_goals(action, json_output),
        Commands::Assets { action } => assets::dispatch_assets(action, json_output),
        Commands::Calc { action } => planning::dispatch_calc(action, json_output),
        Commands::Project { action } => planning::dispatch_project(action, json_output),
        Commands::Emergency {
            balance,
            monthly_cost,
            months,
            goal,
            contribution,
        } => planning::dispatch_emergency(
            balance.as_deref(),
            monthly_cost.as_deref(),
            months,
            goal.as_deref(),
            &contribution,
            json_output,
        ),
        Commands::Summary { action } => reports::dispatch_summary(action, json_output),
        Commands::Chat { action, text, yes } => {
            assistant::dispatch_chat(action, &text.join(" "), yes, json_output).await
        }
        Commands::Clip { text } => tools::dispatch_clip(text, json_output),
        Commands::Link { url } => tools::dispatch_link(&url, json_output),
        Commands::Config { action } => tools::dispatch_config(action, json_output),
        Commands::Palette | Commands::Interactive => {
            println!(
                "{} Already in interactive mode; type {} to open the palette",
                "ℹ".blue().bold(),
                "palette".cyan()
            );
            Ok(())
        }
    }
}

fn dispatch_init(json_output: bool) -> Result<()> {
    let config = AppConfig::load()?;
    let path = match config.db_path() {
        Some(path) => path,
        None => db::get_default_db_path()?,
    };
    db::init_database(Some(path.clone()))?;
    if json_output {
        return print_json(&serde_json::json!({ "database": path }));
    }
    println!("{} Database ready at {}", "✓".green().bold(), path.display());
    Ok(())
}

/// Open the configured database, creating and seeding it when needed
pub(crate) fn open_store() -> Result<(AppConfig, Connection)> {
    let config = AppConfig::load()?;
    db::init_database(config.db_path())?;
    let conn = db::open_db(config.db_path())?;
    Ok((config, conn))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Money typed by the user, in Brazilian (1.234,56) or plain (1234.56) notation
pub(crate) fn parse_money(value: &str, field: &str) -> Result<Decimal> {
    parse_amount(value).ok_or_else(|| invalid(format!("Invalid {}: {:?}", field, value)))
}

pub(crate) fn parse_optional_money(value: Option<&str>, field: &str) -> Result<Option<Decimal>> {
    value.map(|v| parse_money(v, field)).transpose()
}

/// A date argument, today when absent
pub(crate) fn parse_day(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(text) => parse_date(text)
            .ok_or_else(|| invalid(format!("Invalid date {:?}. Use DD/MM/YYYY or YYYY-MM-DD", text))),
        None => Ok(today()),
    }
}

/// A `YYYY-MM` argument, the current month when absent
pub(crate) fn parse_month_arg(value: Option<&str>) -> Result<(i32, u32)> {
    match value {
        Some(text) => parse_month_ref(text),
        None => {
            let now = today();
            Ok((now.year(), now.month()))
        }
    }
}

pub(crate) fn parse_choice<T: std::str::FromStr>(value: &str, what: &str, expected: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid(format!("Invalid {} {:?}. Expected {}", what, value, expected)))
}

/// Card by numeric id or by name
pub(crate) fn resolve_card(conn: &Connection, key: &str) -> Result<Card> {
    let card = match key.trim().parse::<i64>() {
        Ok(id) => db::get_card(conn, id)?,
        Err(_) => db::find_card_by_name(conn, key)?,
    };
    card.ok_or_else(|| FinanceError::NotFound(format!("card {}", key)).into())
}

pub(crate) fn resolve_account(conn: &Connection, name: &str) -> Result<Account> {
    db::get_account_by_name(conn, name)?.ok_or_else(|| FinanceError::NotFound(format!("account {}", name)).into())
}

pub(crate) fn resolve_category(conn: &Connection, name: &str) -> Result<Category> {
    db::find_category(conn, name)?
        .ok_or_else(|| FinanceError::NotFound(format!("category {}", name)))
        .context("Use `financetrack categories list` to see the available categories")
}
