use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use super::{
    open_store, parse_choice, parse_day, parse_money, parse_optional_money, print_json, resolve_account,
    resolve_card, resolve_category, today,
};
use crate::cli::formatters::{format_card_statement, format_cards_table, format_empty, format_installment_purchases};
use crate::cli::{CardCommands, InstallmentCommands, InvoiceCommands};
use financetrack::contextual::ContextualDetector;
use financetrack::db::{self, Card, CardType, InstallmentPurchase};
use financetrack::deep_links::installment_details_link;
use financetrack::error::FinanceError;
use financetrack::periods::{month_ref, parse_month_ref};
use financetrack::reports::{card_statement, invoice_reference};
use financetrack::utils::format_currency;

pub fn dispatch_cards(action: CardCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        CardCommands::Add {
            name,
            card_type,
            limit,
            closing_day,
            due_day,
            account,
        } => {
            let card = Card {
                id: None,
                name: name.clone(),
                card_type: parse_choice::<CardType>(&card_type, "card type", "credito, debito or ambos")?,
                credit_limit: parse_optional_money(limit.as_deref(), "limit")?,
                closing_day,
                due_day,
                account_id: account
                    .map(|a| resolve_account(&conn, &a))
                    .transpose()?
                    .and_then(|a| a.id),
                active: true,
            };
            let id = db::insert_card(&conn, &card)?;
            if json_output {
                return print_json(&db::get_card(&conn, id)?);
            }
            println!("{} Cartão {} cadastrado (#{})", "✓".green().bold(), name.bold(), id);
            Ok(())
        }
        CardCommands::List => {
            let cards = db::list_cards(&conn)?;
            if json_output {
                return print_json(&cards);
            }
            if cards.is_empty() {
                print!("{}", format_empty("Nenhum cartão cadastrado. Use: financetrack cards add <nome>"));
                return Ok(());
            }
            println!("{}", format_cards_table(&cards));
            Ok(())
        }
        CardCommands::Invoice { card, month } => {
            let card = resolve_card(&conn, &card)?;
            let card_id = card.id.ok_or_else(|| FinanceError::NotFound(format!("card {}", card.name)))?;
            let now = today();
            let (year, m) = match month {
                Some(text) => parse_month_ref(&text)?,
                None => invoice_reference(now, card.closing_day),
            };
            let statement = card_statement(&conn, card_id, year, m, now)?;

            if json_output {
                return print_json(&statement);
            }
            print!("{}", format_card_statement(&statement));

            // A closed, unpaid invoice gets the pay shortcut
            if !statement.paid && statement.total > Decimal::ZERO && now > statement.period_end {
                let mut detector = ContextualDetector::new();
                let action = detector.invoice_closed(card_id, &statement.reference_month);
                println!("\n{} {}", "💡".yellow(), action.title());
                println!("   {}", action.deep_link().cyan());
                println!("   financetrack invoices pay {} {}", card_id, statement.reference_month);
            }
            Ok(())
        }
    }
}

pub fn dispatch_invoices(action: InvoiceCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    let (card, month, paid) = match action {
        InvoiceCommands::Pay { card, month } => (card, month, true),
        InvoiceCommands::Unpay { card, month } => (card, month, false),
    };
    let card = resolve_card(&conn, &card)?;
    let card_id = card.id.ok_or_else(|| FinanceError::NotFound(format!("card {}", card.name)))?;
    let (year, m) = parse_month_ref(&month)?;
    let invoice = db::set_invoice_paid(&conn, card_id, &month_ref(year, m), paid)?;

    if json_output {
        return print_json(&invoice);
    }
    let status = if paid { "paga".green() } else { "em aberto".yellow() };
    println!(
        "{} Fatura {} do cartão {} marcada como {}",
        "✓".green().bold(),
        invoice.reference_month,
        card.name.bold(),
        status
    );
    Ok(())
}

pub fn dispatch_installments(action: InstallmentCommands, json_output: bool) -> Result<()> {
    let (_, conn) = open_store()?;
    match action {
        InstallmentCommands::Add {
            description,
            amount,
            count,
            card,
            first_due,
            category,
        } => {
            let purchase = InstallmentPurchase {
                id: None,
                description: description.clone(),
                total_amount: parse_money(&amount, "amount")?,
                installment_count: count,
                first_due_date: parse_day(first_due.as_deref())?,
                card_id: card.map(|c| resolve_card(&conn, &c)).transpose()?.and_then(|c| c.id),
                category_id: category
                    .map(|c| resolve_category(&conn, &c))
                    .transpose()?
                    .and_then(|c| c.id),
            };
            let (id, installments) = db::create_installment_purchase(&conn, &purchase)?;

            if json_output {
                return print_json(&serde_json::json!({ "id": id, "installments": installments }));
            }
            println!(
                "{} {} em {}x registrada (#{})",
                "✓".green().bold(),
                description.bold(),
                count,
                id
            );
            for item in &installments {
                println!(
                    "  {:>2}/{}  {}  {}",
                    item.number,
                    count,
                    item.due_date.format("%d/%m/%Y"),
                    format_currency(item.amount)
                );
            }
            Ok(())
        }
        InstallmentCommands::List => {
            let purchases = db::list_installment_purchases(&conn)?;
            if json_output {
                return print_json(&purchases);
            }
            if purchases.is_empty() {
                print!("{}", format_empty("Nenhuma compra parcelada"));
                return Ok(());
            }
            println!("{}", format_installment_purchases(&purchases));
            Ok(())
        }
        InstallmentCommands::Show { id } => {
            let purchase = db::list_installment_purchases(&conn)?
                .into_iter()
                .find(|p| p.id == Some(id))
                .ok_or_else(|| FinanceError::NotFound(format!("installment purchase {}", id)))?;
            let installments = db::list_purchase_installments(&conn, id)?;

            if json_output {
                return print_json(&serde_json::json!({ "purchase": purchase, "installments": installments }));
            }
            println!(
                "\n{} {} - {} em {}x\n",
                "🧾".cyan(),
                purchase.description.bold(),
                format_currency(purchase.total_amount),
                purchase.installment_count
            );
            for item in &installments {
                let status = if item.paid { "paga".green() } else { "pendente".yellow() };
                println!(
                    "  #{:<5} {:>2}/{}  {}  {:>14}  {}",
                    item.id.unwrap_or_default(),
                    item.number,
                    purchase.installment_count,
                    item.due_date.format("%d/%m/%Y"),
                    format_currency(item.amount),
                    status
                );
            }
            println!("\n  {}", installment_details_link(id).bright_black());
            Ok(())
        }
        InstallmentCommands::Pay { installment_id, undo } => {
            if !db::set_installment_paid(&conn, installment_id, !undo)? {
                return Err(FinanceError::NotFound(format!("installment {}", installment_id)).into());
            }
            if json_output {
                return print_json(&serde_json::json!({ "installment": installment_id, "paid": !undo }));
            }
            let status = if undo { "pendente" } else { "paga" };
            println!("{} Parcela #{} marcada como {}", "✓".green().bold(), installment_id, status);
            Ok(())
        }
    }
}
