//! Interactive mode
//!
//! A readline REPL over the regular subcommands, plus the full-screen
//! command palette and payment-code detection for pasted text.

pub mod event_loop;
pub mod palette_view;
pub mod progress;
pub mod readline;

use anyhow::Result;
use clap::CommandFactory;
use colored::Colorize;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::cli::Cli;
use crate::commands::{parse_command, Command};
use crate::dispatcher::{dispatch_command, open_store};
use financetrack::contextual::ContextualDetector;
use financetrack::db;
use financetrack::deep_links::resolve_deep_link;
use financetrack::palette::PaletteCommand;

const PROMPT: &str = "financetrack> ";

const COMMAND_PATTERNS: readline::CommandPatterns = &[
    // Ledger
    &["transactions", "add"],
    &["transactions", "list"],
    &["transactions", "show"],
    &["transactions", "delete"],
    &["accounts", "add"],
    &["accounts", "list"],
    &["accounts", "deactivate"],
    &["categories", "list"],
    &["categories", "add"],
    &["month", "ensure"],
    &["month", "close"],
    &["month", "history"],
    // Cards
    &["cards", "add"],
    &["cards", "list"],
    &["cards", "invoice"],
    &["invoices", "pay"],
    &["invoices", "unpay"],
    &["installments", "add"],
    &["installments", "list"],
    &["installments", "show"],
    &["installments", "pay"],
    // Goals & planning
    &["goals", "monthly", "add"],
    &["goals", "monthly", "list"],
    &["goals", "monthly", "delete"],
    &["goals", "financial", "add"],
    &["goals", "financial", "list"],
    &["goals", "financial", "contribute"],
    &["goals", "financial", "delete"],
    &["assets", "add"],
    &["assets", "list"],
    &["assets", "update"],
    &["assets", "delete"],
    &["assets", "summary"],
    &["calc", "interest"],
    &["calc", "needed"],
    &["calc", "simulations"],
    &["calc", "delete-simulation"],
    &["project", "budget"],
    &["project", "business"],
    &["project", "education"],
    &["project", "property"],
    &["project", "retirement"],
    &["project", "list"],
    &["project", "delete"],
    &["emergency"],
    // Reports
    &["summary", "month"],
    &["summary", "year"],
    &["summary", "period"],
    // Statements & assistant
    &["import"],
    &["analyze"],
    &["chat"],
    &["chat", "history"],
    &["chat", "clear"],
    // Utilities & session
    &["clip"],
    &["link"],
    &["config", "show"],
    &["config", "path"],
    &["config", "set-key"],
    &["palette"],
    &["help"],
    &["exit"],
    &["quit"],
];

/// Editor with store names for completion; history lives next to the database
fn open_readline() -> Result<readline::Readline> {
    let (config, conn) = open_store()?;
    let db_path = match config.db_path() {
        Some(path) => path,
        None => db::get_default_db_path()?,
    };
    let helper = readline::ReplHelper::new(COMMAND_PATTERNS, readline::KnownNames::load(&conn)?);
    readline::Readline::new(helper, db_path.with_file_name("history"))
}

fn refresh_names(rl: &mut readline::Readline) {
    match open_store().and_then(|(_, conn)| readline::KnownNames::load(&conn)) {
        Ok(names) => rl.set_names(names),
        Err(e) => debug!("Keeping previous completion names: {:#}", e),
    }
}

/// Launch the interactive REPL.
pub async fn launch_tui() -> Result<()> {
    println!("{}", "FinanceTrack - Modo interativo".bold());
    println!(
        "Digite {} para ajuda, {} para a paleta, {} para sair\n",
        "help".cyan(),
        "palette".cyan(),
        "exit".cyan()
    );

    let mut rl = open_readline()?;
    let mut detector = ContextualDetector::new();
    let mut prefill: Option<String> = None;

    loop {
        let line = match prefill.take() {
            Some(initial) => rl.readline_with_initial(PROMPT, &initial),
            None => rl.readline(PROMPT),
        };
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Ok(Command::Exit) => {
                        println!("Até logo!");
                        break;
                    }
                    Ok(Command::Help) => {
                        println!("{}", Cli::command().render_long_help());
                    }
                    Ok(Command::Palette) => match palette_view::pick_command() {
                        Ok(Some(command)) => prefill = Some(format!("{} ", command.cli_command)),
                        Ok(None) => {}
                        Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                    },
                    Ok(Command::Run { command, json }) => {
                        if let Err(e) = dispatch_command(command, json).await {
                            eprintln!("{} {:#}", "Error:".red().bold(), e);
                        }
                        refresh_names(&mut rl);
                    }
                    Err(e) => {
                        // Pasted boleto lines and PIX codes are not commands
                        match detector.observe_clipboard(trimmed) {
                            Some(action) => {
                                println!("{} {}", "💡".yellow(), action.title());
                                let link = action.deep_link();
                                println!("   {}", link.cyan());
                                if let Ok(target) = resolve_deep_link(&link) {
                                    prefill = Some(target.cli_hint());
                                }
                                detector.dismiss();
                            }
                            None => eprintln!("{} {}", "Parse error:".yellow().bold(), e.message),
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                println!("Até logo!");
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}

/// `financetrack palette`: pick a command and run it when it needs no arguments
pub async fn run_palette(json_output: bool) -> Result<()> {
    let Some(command) = palette_view::pick_command()? else {
        return Ok(());
    };
    run_selected(&command, json_output).await
}

async fn run_selected(command: &PaletteCommand, json_output: bool) -> Result<()> {
    match parse_command(command.cli_command) {
        Ok(Command::Run { command, json }) => dispatch_command(command, json || json_output).await,
        _ => {
            println!("financetrack {} ...", command.cli_command.cyan());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financetrack::palette::default_commands;

    #[test]
    fn palette_commands_are_known_patterns() {
        for command in default_commands() {
            let first = command.cli_command.split_whitespace().next().unwrap_or_default();
            assert!(
                COMMAND_PATTERNS.iter().any(|p| p[0] == first),
                "{} has no completion pattern",
                command.cli_command
            );
        }
    }

    #[test]
    fn patterns_parse_as_subcommands() {
        // Patterns that need no arguments must be accepted as typed
        for line in ["summary month", "cards list", "config path", "calc simulations", "assets summary"] {
            assert!(matches!(parse_command(line), Ok(Command::Run { .. })), "{}", line);
        }
    }
}
