use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use super::{open_store, print_json, resolve_account};
use crate::cli::formatters::{format_statement_analysis, format_statement_preview};
use crate::ui::progress::{ProgressEvent, ProgressReporter};
use financetrack::analysis::{analyze_statement, classify_entries, ClassifiedEntry, KeywordClassifier};
use financetrack::assistant::AssistantClient;
use financetrack::config::AppConfig;
use financetrack::importers::{parse_statement, save_entries, ImportOptions, ParsedStatement, StatementEntry};

const PREVIEW_ROWS: usize = 15;

pub async fn dispatch_import(
    file: &str,
    dry_run: bool,
    account: Option<&str>,
    assistant: bool,
    json_output: bool,
) -> Result<()> {
    info!("Importing statement from: {}", file);
    let (config, conn) = open_store()?;
    let statement = parse_statement(file).with_context(|| format!("Error reading statement {}", file))?;
    let format = statement.format;

    let account_name = account.map(str::to_string).or_else(|| config.import.default_account.clone());
    let account_id = account_name
        .map(|name| resolve_account(&conn, &name))
        .transpose()?
        .and_then(|a| a.id);

    let entries = classify(&config, statement, assistant, json_output).await;
    let options = ImportOptions {
        account_id,
        source: format!("import:{}", format.as_str()),
        dry_run,
    };
    let summary = save_entries(&conn, &entries, &options)?;

    if json_output {
        return print_json(&serde_json::json!({
            "format": format,
            "dry_run": dry_run,
            "entries": entries.len(),
            "summary": summary,
        }));
    }

    println!(
        "\n{} {} lançamentos lidos ({})\n",
        "✓".green().bold(),
        entries.len(),
        format.as_str().to_uppercase()
    );
    if !entries.is_empty() {
        println!("{}", format_statement_preview(&entries, PREVIEW_ROWS));
    }

    if dry_run {
        println!(
            "\n{} Simulação: {} seriam importados, {} duplicados, {} ignorados",
            "ℹ".blue().bold(),
            summary.inserted,
            summary.duplicates,
            summary.skipped
        );
        return Ok(());
    }

    println!(
        "\n{} {} importados, {} duplicados, {} ignorados",
        "✓".green().bold(),
        summary.inserted.to_string().green(),
        summary.duplicates,
        summary.skipped
    );
    if summary.errors > 0 {
        println!("{} {} linhas com erro", "⚠".yellow().bold(), summary.errors);
    }
    Ok(())
}

pub async fn dispatch_analyze(file: &str, assistant: bool, json_output: bool) -> Result<()> {
    let config = AppConfig::load()?;
    let statement = parse_statement(file).with_context(|| format!("Error reading statement {}", file))?;
    let entries = classify(&config, statement, assistant, json_output).await;
    let analysis = analyze_statement(&entries);

    if json_output {
        return print_json(&serde_json::json!({ "entries": entries, "analysis": analysis }));
    }
    if !entries.is_empty() {
        println!("{}", format_statement_preview(&entries, PREVIEW_ROWS));
    }
    print!("{}", format_statement_analysis(&analysis));
    Ok(())
}

/// Keyword classification, or the assistant when asked for and configured.
/// Lines the assistant fails on are kept as unclassified.
async fn classify(
    config: &AppConfig,
    statement: ParsedStatement,
    assistant: bool,
    json_output: bool,
) -> Vec<ClassifiedEntry> {
    let keywords = KeywordClassifier::new();
    if !(assistant || config.import.classify_with_assistant) {
        return classify_entries(statement.entries, &keywords);
    }

    let client = match AssistantClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            warn!("Assistant unavailable, using keyword rules: {}", e);
            if !json_output {
                eprintln!("{} {}", "⚠".yellow().bold(), e);
            }
            return classify_entries(statement.entries, &keywords);
        }
    };

    let progress = ProgressReporter::new(statement.entries.len() as u64, json_output);
    let mut classified = Vec::with_capacity(statement.entries.len());
    for entry in statement.entries {
        classified.push(classify_one(&client, entry, &progress).await);
    }
    progress.finish();
    classified
}

async fn classify_one(client: &AssistantClient, entry: StatementEntry, progress: &ProgressReporter) -> ClassifiedEntry {
    let result = client.classify_description(&entry.description).await;
    if let Err(e) = &result {
        progress.emit(ProgressEvent::Line {
            text: format!("{} {}: {}", "⚠".yellow(), entry.description, e),
        });
    }
    progress.emit(ProgressEvent::Step {
        text: entry.description.chars().take(30).collect(),
    });
    ClassifiedEntry::from_result(entry, result)
}
