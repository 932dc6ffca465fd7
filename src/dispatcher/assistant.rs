use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use tracing::info;

use super::{open_store, print_json, today};
use crate::cli::formatters::format_empty;
use crate::cli::ChatCommands;
use financetrack::assistant::{AssistantClient, AssistantReply, TransactionSuggestion};
use financetrack::db::{self, ChatRole, Transaction};
use financetrack::error::invalid;
use financetrack::utils::format_currency;

/// Earlier turns sent along with each message
const CONTEXT_MESSAGES: usize = 10;

pub async fn dispatch_chat(action: Option<ChatCommands>, text: &str, yes: bool, json_output: bool) -> Result<()> {
    let (config, conn) = open_store()?;

    match action {
        Some(ChatCommands::History { limit }) => {
            let messages = db::recent_chat_messages(&conn, limit)?;
            if json_output {
                return print_json(&messages);
            }
            if messages.is_empty() {
                print!("{}", format_empty("Nenhuma conversa registrada"));
                return Ok(());
            }
            for m in &messages {
                let who = match m.role {
                    ChatRole::User => "você".cyan().bold(),
                    ChatRole::Assistant => "assistente".magenta().bold(),
                };
                println!("{}: {}", who, m.content);
            }
            Ok(())
        }
        Some(ChatCommands::Clear) => {
            let removed = db::clear_chat_history(&conn)?;
            if json_output {
                return print_json(&serde_json::json!({ "removed": removed }));
            }
            println!("{} Histórico apagado ({} mensagens)", "✓".green().bold(), removed);
            Ok(())
        }
        None => {
            let text = text.trim();
            if text.is_empty() {
                return Err(invalid("Empty message. Try: financetrack chat gastei 50 no mercado"));
            }
            let client = AssistantClient::from_config(&config)?;
            let history = db::recent_chat_messages(&conn, CONTEXT_MESSAGES)?;
            let reply = client.chat(&history, text).await?;

            db::insert_chat_message(&conn, ChatRole::User, text)?;
            let stored = match &reply {
                AssistantReply::Transaction(s) => s.confirmation.clone(),
                AssistantReply::Message(m) => m.clone(),
            };
            db::insert_chat_message(&conn, ChatRole::Assistant, &stored)?;

            match reply {
                AssistantReply::Message(message) => {
                    if json_output {
                        return print_json(&serde_json::json!({ "message": message }));
                    }
                    println!("{} {}", "🤖".magenta(), message);
                    Ok(())
                }
                AssistantReply::Transaction(suggestion) => {
                    // JSON callers cannot answer a prompt
                    let accepted = yes || (!json_output && confirm(&suggestion)?);
                    let saved = if accepted { Some(save_suggestion(&conn, &suggestion)?) } else { None };
                    if json_output {
                        return print_json(&serde_json::json!({ "suggestion": suggestion, "saved_id": saved }));
                    }
                    match saved {
                        Some(id) => println!("{} Transação #{} registrada", "✓".green().bold(), id),
                        None => println!("{} Nada registrado", "ℹ".blue().bold()),
                    }
                    Ok(())
                }
            }
        }
    }
}

fn confirm(suggestion: &TransactionSuggestion) -> Result<bool> {
    println!("{} {}", "🤖".magenta(), suggestion.confirmation);
    println!(
        "   {} · {} · {} · {} ({}% de confiança)",
        suggestion.kind.label(),
        suggestion.category,
        format_currency(suggestion.amount).bold(),
        suggestion.description,
        suggestion.confidence
    );
    print!("Registrar? [s/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}

fn save_suggestion(conn: &rusqlite::Connection, suggestion: &TransactionSuggestion) -> Result<i64> {
    let mut tx = Transaction::new(suggestion.kind, suggestion.amount, &suggestion.description, today());
    tx.category_id = db::find_category(conn, &suggestion.category)?.and_then(|c| c.id);
    tx.source = "assistant".to_string();
    info!("Saving assistant suggestion: {}", tx.description);
    db::insert_transaction(conn, &tx)
}
