//! Line editing for the REPL: persistent history, history hints and
//! completion of subcommands and of the card, account and category names
//! already stored.

use std::path::PathBuf;

use anyhow::Result;
use itertools::Itertools;
use rusqlite::Connection;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};
use tracing::debug;

use financetrack::db;
use financetrack::utils::fold_text;

pub type CommandPatterns = &'static [&'static [&'static str]];

/// Names the store knows, offered after the arguments that take them
#[derive(Debug, Clone, Default)]
pub struct KnownNames {
    pub cards: Vec<String>,
    pub accounts: Vec<String>,
    pub categories: Vec<String>,
}

impl KnownNames {
    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            cards: db::list_cards(conn)?.into_iter().map(|c| c.name).collect(),
            accounts: db::list_accounts(conn, false)?.into_iter().map(|a| a.name).collect(),
            categories: db::list_categories(conn)?.into_iter().map(|c| c.name).collect(),
        })
    }

    fn after_flag(&self, flag: &str) -> Option<&[String]> {
        match flag {
            "--card" => Some(&self.cards),
            "-a" | "--account" => Some(&self.accounts),
            "-c" | "--category" => Some(&self.categories),
            _ => None,
        }
    }
}

pub struct ReplHelper {
    commands: CommandPatterns,
    names: KnownNames,
    hinter: HistoryHinter,
}

impl ReplHelper {
    pub fn new(commands: CommandPatterns, names: KnownNames) -> Self {
        Self {
            commands,
            names,
            hinter: HistoryHinter::default(),
        }
    }

    /// Words that may replace `word`, given the words typed before it
    fn candidates(&self, typed: &[&str], word: &str) -> Vec<String> {
        if let Some(names) = typed.last().and_then(|flag| self.names.after_flag(flag)) {
            return matching_names(names, word);
        }

        let slash = typed.first().unwrap_or(&word).starts_with('/');
        let path: Vec<String> = typed
            .iter()
            .map(|w| w.trim_start_matches('/').to_lowercase())
            .collect();
        if path == ["cards", "invoice"] {
            return matching_names(&self.names.cards, word);
        }

        let prefix = word.trim_start_matches('/').to_lowercase();
        self.commands
            .iter()
            .filter(|pattern| pattern.len() > path.len() && pattern.iter().zip(&path).all(|(p, w)| p == w))
            .map(|pattern| pattern[path.len()])
            .filter(|next| next.starts_with(&prefix))
            .unique()
            .map(|next| if slash && path.is_empty() { format!("/{}", next) } else { next.to_string() })
            .collect()
    }
}

/// Accent- and case-insensitive prefix match; names with spaces come quoted
fn matching_names(names: &[String], word: &str) -> Vec<String> {
    let prefix = fold_text(word.trim_start_matches(['"', '\'']));
    names
        .iter()
        .filter(|name| fold_text(name).starts_with(&prefix))
        .map(|name| if name.contains(' ') { format!("\"{}\"", name) } else { name.clone() })
        .collect()
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = before.rfind(' ').map_or(0, |i| i + 1);
        let typed: Vec<&str> = before[..start].split_whitespace().collect();

        let pairs = self
            .candidates(&typed, &before[start..])
            .into_iter()
            .map(|word| Pair {
                replacement: format!("{} ", word),
                display: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ReplHelper {}
impl Validator for ReplHelper {}
impl Helper for ReplHelper {}

pub struct Readline {
    editor: Editor<ReplHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Readline {
    pub fn new(helper: ReplHelper, history_path: PathBuf) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(helper));

        if let Some(parent) = history_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Err(e) = editor.load_history(&history_path) {
            debug!("No REPL history loaded from {}: {}", history_path.display(), e);
        }
        Ok(Self { editor, history_path })
    }

    /// Swap the completion names after a command changed the store
    pub fn set_names(&mut self, names: KnownNames) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.names = names;
        }
    }

    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        self.read(prompt, "")
    }

    /// Prompt with `initial` already typed, cursor at the end
    pub fn readline_with_initial(&mut self, prompt: &str, initial: &str) -> Result<String, ReadlineError> {
        self.read(prompt, initial)
    }

    fn read(&mut self, prompt: &str, initial: &str) -> Result<String, ReadlineError> {
        let line = self.editor.readline_with_initial(prompt, (initial, ""))?;
        if !line.trim().is_empty() {
            self.editor.add_history_entry(line.as_str())?;
            if let Err(e) = self.editor.append_history(&self.history_path) {
                debug!("Failed to save REPL history: {}", e);
            }
        }
        Ok(line)
    }
}
