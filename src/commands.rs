//! Line parsing for the interactive REPL
//!
//! Lines typed at the prompt go through the same clap definitions as the
//! command line, so every subcommand works in both places.

use clap::Parser;

use crate::cli::{Cli, Commands};

/// Parsed REPL line
#[derive(Debug)]
pub enum Command {
    /// A regular subcommand, with `--json` when given on the line
    Run { command: Commands, json: bool },
    Palette,
    Help,
    Exit,
}

/// Error type for command parsing
#[derive(Debug, Clone)]
pub struct CommandParseError {
    pub message: String,
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandParseError {}

/// Split a line into words, honoring single and double quotes
pub fn split_line(input: &str) -> Result<Vec<String>, CommandParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CommandParseError {
            message: "Unterminated quote".to_string(),
        });
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse a REPL line. A leading `/` is accepted (`/summary month`).
pub fn parse_command(input: &str) -> Result<Command, CommandParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandParseError {
            message: "Empty command. Type `help` for commands.".to_string(),
        });
    }
    let input = input.strip_prefix('/').unwrap_or(input);

    match input.to_lowercase().as_str() {
        "exit" | "quit" | "q" => return Ok(Command::Exit),
        "help" | "?" => return Ok(Command::Help),
        "palette" | "p" => return Ok(Command::Palette),
        _ => {}
    }

    let mut args = vec!["financetrack".to_string()];
    args.extend(split_line(input)?);

    let cli = Cli::try_parse_from(args).map_err(|e| CommandParseError {
        message: e.render().to_string().trim_end().to_string(),
    })?;
    match cli.command {
        Some(Commands::Palette) => Ok(Command::Palette),
        Some(command) => Ok(Command::Run {
            command,
            json: cli.json,
        }),
        None => Ok(Command::Help),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{SummaryCommands, TransactionCommands};

    #[test]
    fn test_split_line_quotes() {
        let words = split_line(r#"transactions add diario 12,50 "pão de queijo" --category 'Alimentação'"#).unwrap();
        assert_eq!(
            words,
            vec!["transactions", "add", "diario", "12,50", "pão de queijo", "--category", "Alimentação"]
        );
    }

    #[test]
    fn test_split_line_empty_quotes_kept() {
        assert_eq!(split_line(r#"a "" b"#).unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_line_unterminated() {
        assert!(split_line("chat \"oi").is_err());
    }

    #[test]
    fn test_parse_transaction_add() {
        match parse_command("transactions add diario 50 \"mercado da esquina\"").unwrap() {
            Command::Run {
                command:
                    Commands::Transactions {
                        action: TransactionCommands::Add { amount, description, .. },
                    },
                json: false,
            } => {
                assert_eq!(amount, "50");
                assert_eq!(description, "mercado da esquina");
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_with_slash_and_json() {
        match parse_command("/summary month 2025-03 --json").unwrap() {
            Command::Run {
                command:
                    Commands::Summary {
                        action: SummaryCommands::Month { month, .. },
                    },
                json: true,
            } => assert_eq!(month.as_deref(), Some("2025-03")),
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_parse_session_words() {
        assert!(matches!(parse_command("exit").unwrap(), Command::Exit));
        assert!(matches!(parse_command("QUIT").unwrap(), Command::Exit));
        assert!(matches!(parse_command("?").unwrap(), Command::Help));
        assert!(matches!(parse_command("palette").unwrap(), Command::Palette));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse_command("portfolio show").unwrap_err();
        assert!(err.message.contains("unrecognized subcommand"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_command("   ").unwrap_err().message.contains("Empty command"));
    }
}
