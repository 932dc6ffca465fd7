use anyhow::Result;
use colored::Colorize;
use tracing::info;

use super::{
    open_store, parse_choice, parse_day, parse_money, parse_month_arg, print_json, resolve_account, resolve_card,
    resolve_category,
};
use crate::cli::formatters::{
    format_accounts_table, format_categories_table, format_empty, format_transaction_detail,
    format_transactions_table,
};
use crate::cli::{AccountCommands, CategoryCommands, MonthCommands, TransactionCommands};
use financetrack::db::{self, CategoryKind, Transaction, TransactionFilter, TransactionKind};
use financetrack::error::FinanceError;
use financetrack::periods::{month_bounds, month_name, parse_month_ref};
use financetrack::utils::format_currency;

const KINDS: &str = "entrada, saida_fixa or diario";

pub fn dispatch_transactions(action: TransactionCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        TransactionCommands::Add {
            kind,
            amount,
            description,
            date,
            category,
            account,
            card,
        } => {
            let mut tx = Transaction::new(
                parse_choice::<TransactionKind>(&kind, "transaction kind", KINDS)?,
                parse_money(&amount, "amount")?,
                &description,
                parse_day(date.as_deref())?,
            );
            tx.category_id = category
                .map(|name| resolve_category(&conn, &name))
                .transpose()?
                .and_then(|c| c.id);
            tx.account_id = account
                .map(|name| resolve_account(&conn, &name))
                .transpose()?
                .and_then(|a| a.id);
            tx.card_id = card.map(|key| resolve_card(&conn, &key)).transpose()?.and_then(|c| c.id);

            info!("Adding {} transaction: {}", tx.kind.as_str(), tx.description);
            let id = db::insert_transaction(&conn, &tx)?;
            tx.id = Some(id);

            if json_output {
                return print_json(&tx);
            }
            println!(
                "{} {} de {} registrada (#{})",
                "✓".green().bold(),
                tx.kind.label(),
                format_currency(tx.amount),
                id
            );
            Ok(())
        }
        TransactionCommands::List {
            month,
            kind,
            category,
            card,
            limit,
        } => {
            let mut filter = TransactionFilter {
                limit: Some(limit),
                ..Default::default()
            };
            if let Some(month) = month {
                let (year, m) = parse_month_ref(&month)?;
                let (from, to) = month_bounds(year, m)?;
                filter.from = Some(from);
                filter.to = Some(to);
            }
            filter.kind = kind
                .map(|k| parse_choice::<TransactionKind>(&k, "transaction kind", KINDS))
                .transpose()?;
            filter.category_id = category
                .map(|name| resolve_category(&conn, &name))
                .transpose()?
                .and_then(|c| c.id);
            filter.card_id = card.map(|key| resolve_card(&conn, &key)).transpose()?.and_then(|c| c.id);

            let transactions = db::list_transactions(&conn, &filter)?;
            if json_output {
                return print_json(&transactions);
            }
            if transactions.is_empty() {
                print!("{}", format_empty("Nenhuma transação encontrada"));
                return Ok(());
            }
            println!("{}", format_transactions_table(&transactions));
            Ok(())
        }
        TransactionCommands::Show { id } => {
            let tx = db::get_transaction(&conn, id)?
                .ok_or_else(|| FinanceError::NotFound(format!("transaction {}", id)))?;
            if json_output {
                return print_json(&tx);
            }
            print!("{}", format_transaction_detail(&tx));
            Ok(())
        }
        TransactionCommands::Delete { id } => {
            if !db::soft_delete_transaction(&conn, id)? {
                return Err(FinanceError::NotFound(format!("transaction {}", id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "deleted": id }));
            }
            println!("{} Transação #{} removida", "✓".green().bold(), id);
            Ok(())
        }
    }
}

pub fn dispatch_accounts(action: AccountCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        AccountCommands::Add { name, bank, balance } => {
            let balance = parse_money(&balance, "balance")?;
            let id = db::insert_account(&conn, &name, bank.as_deref(), balance)?;
            if json_output {
                return print_json(&db::get_account(&conn, id)?);
            }
            println!("{} Conta {} criada com saldo {}", "✓".green().bold(), name.bold(), format_currency(balance));
            Ok(())
        }
        AccountCommands::List { all } => {
            let accounts = db::list_accounts(&conn, all)?;
            if json_output {
                return print_json(&accounts);
            }
            if accounts.is_empty() {
                print!("{}", format_empty("Nenhuma conta cadastrada. Use: financetrack accounts add <nome>"));
                return Ok(());
            }
            println!("{}", format_accounts_table(&accounts));
            Ok(())
        }
        AccountCommands::Deactivate { name } => {
            let account = resolve_account(&conn, &name)?;
            let id = account.id.ok_or_else(|| FinanceError::NotFound(format!("account {}", name)))?;
            db::set_account_active(&conn, id, false)?;
            if json_output {
                return print_json(&serde_json::json!({ "deactivated": id }));
            }
            println!("{} Conta {} desativada", "✓".green().bold(), account.name.bold());
            Ok(())
        }
    }
}

pub fn dispatch_categories(action: CategoryCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        CategoryCommands::List => {
            let categories = db::list_categories(&conn)?;
            if json_output {
                return print_json(&categories);
            }
            println!("{}", format_categories_table(&categories));
            Ok(())
        }
        CategoryCommands::Add { name, icon, color, kind } => {
            let kind = parse_choice::<CategoryKind>(&kind, "category kind", "fixa or variavel")?;
            if db::find_category(&conn, &name)?.is_some() {
                return Err(financetrack::error::invalid(format!("Category {:?} already exists", name)));
            }
            let id = db::insert_category(&conn, &name, &icon, &color, kind)?;
            if json_output {
                return print_json(&serde_json::json!({ "id": id, "name": name }));
            }
            println!("{} Categoria {} {} criada", "✓".green().bold(), icon, name.bold());
            Ok(())
        }
    }
}

pub fn dispatch_month(action: MonthCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        MonthCommands::Ensure { month } => {
            let (year, m) = parse_month_arg(month.as_deref())?;
            let (financial_month, created) = db::ensure_month_exists(&conn, year, m)?;
            if json_output {
                return print_json(&financial_month);
            }
            let label = format!("{} de {}", month_name(m), year);
            if created {
                println!(
                    "{} Mês {} aberto com saldo inicial {}",
                    "✓".green().bold(),
                    label,
                    format_currency(financial_month.opening_balance)
                );
            } else {
                println!("{} Mês {} já existe ({})", "ℹ".blue().bold(), label, financial_month.status.as_str());
            }
            Ok(())
        }
        MonthCommands::Close { month } => {
            let (year, m) = parse_month_ref(&month)?;
            let closed = db::close_month(&conn, year, m)?;
            if json_output {
                return print_json(&closed);
            }
            println!(
                "{} {} de {} fechado. Saldo final: {}",
                "✓".green().bold(),
                month_name(m),
                year,
                closed.closing_balance.map(format_currency).unwrap_or_default()
            );
            Ok(())
        }
        MonthCommands::History { limit } => {
            let months = db::list_months(&conn, limit)?;
            if json_output {
                return print_json(&months);
            }
            if months.is_empty() {
                print!("{}", format_empty("Nenhum mês registrado"));
                return Ok(());
            }
            for m in &months {
                let closing = m
                    .closing_balance
                    .map(format_currency)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {:>2}/{}  {:<8} inicial {:>14}  final {:>14}",
                    m.month,
                    m.year,
                    m.status.as_str(),
                    format_currency(m.opening_balance),
                    closing
                );
            }
            Ok(())
        }
    }
}
