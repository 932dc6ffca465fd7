//! Command palette: searchable list of commands with keyboard navigation.
//!
//! The palette is a pure state machine driven by crossterm key events, so the
//! same logic backs the interactive view and the tests.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Serialize;

use crate::utils::fold_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteCategory {
    Navigation,
    Actions,
    Quick,
}

impl PaletteCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PaletteCategory::Navigation => "Navegação",
            PaletteCategory::Actions => "Ações rápidas",
            PaletteCategory::Quick => "Atalhos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteCommand {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    pub category: PaletteCategory,
    /// CLI invocation the command stands for (without the binary name)
    pub cli_command: &'static str,
}

const fn nav(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    keywords: &'static [&'static str],
    cli_command: &'static str,
) -> PaletteCommand {
    PaletteCommand {
        id,
        label,
        description,
        keywords,
        category: PaletteCategory::Navigation,
        cli_command,
    }
}

const fn action(
    id: &'static str,
    label: &'static str,
    description: &'static str,
    keywords: &'static [&'static str],
    cli_command: &'static str,
) -> PaletteCommand {
    PaletteCommand {
        id,
        label,
        description,
        keywords,
        category: PaletteCategory::Actions,
        cli_command,
    }
}

const DEFAULT_COMMANDS: &[PaletteCommand] = &[
    nav("dashboard", "Dashboard", "Resumo do mês atual", &["dashboard", "inicio", "principal"], "summary month"),
    nav(
        "transactions",
        "Transações",
        "Ver e gerenciar transações",
        &["transacoes", "gastos", "receitas"],
        "transactions list",
    ),
    nav("cards", "Cartões", "Gerenciar cartões de crédito e débito", &["cartoes", "faturas"], "cards list"),
    nav("monthly-goals", "Metas Mensais", "Ver e criar metas do mês", &["metas", "mensais", "objetivos"], "goals monthly list"),
    nav(
        "financial-goals",
        "Metas Financeiras",
        "Acompanhar metas de longo prazo",
        &["metas", "financeiras", "objetivos"],
        "goals financial list",
    ),
    nav("projections", "Projeções", "Simular o orçamento", &["projecoes", "orcamento"], "project list"),
    nav(
        "compound-interest",
        "Calculadora de Juros",
        "Calcular juros compostos",
        &["calculadora", "juros", "compostos"],
        "calc simulations",
    ),
    nav("monthly-summary", "Resumo Mensal", "Ver o resumo do mês", &["resumo", "mensal"], "summary month"),
    nav("annual-summary", "Resumo Anual", "Ver o resumo do ano", &["resumo", "anual"], "summary year"),
    nav("assets", "Patrimônios", "Investimentos, imóveis e veículos", &["patrimonio", "ativos", "investimentos"], "assets summary"),
    nav("chat", "Chat IA", "Conversar com o assistente", &["chat", "ia", "assistente"], "chat history"),
    nav("import-statement", "Importar Extrato", "Importar extrato bancário", &["importar", "extrato"], "import"),
    nav("settings", "Configurações", "Ver a configuração atual", &["configuracoes", "settings"], "config show"),
    action(
        "quick-transaction",
        "Nova Transação",
        "Adicionar uma transação rapidamente",
        &["nova", "transacao", "adicionar", "gasto"],
        "transactions add",
    ),
    action("quick-category", "Criar Categoria", "Criar uma nova categoria", &["criar", "categoria"], "categories add"),
    action("quick-card", "Criar Cartão", "Cadastrar um novo cartão", &["criar", "cartao"], "cards add"),
];

pub fn default_commands() -> Vec<PaletteCommand> {
    DEFAULT_COMMANDS.to_vec()
}

/// Commands whose label, description or keywords contain the query
/// (case and accent insensitive). A blank query keeps everything.
pub fn filter_commands(commands: &[PaletteCommand], query: &str) -> Vec<PaletteCommand> {
    let needle = fold_text(query.trim());
    if needle.is_empty() {
        return commands.to_vec();
    }
    commands
        .iter()
        .filter(|cmd| {
            fold_text(cmd.label).contains(&needle)
                || fold_text(cmd.description).contains(&needle)
                || cmd.keywords.iter().any(|k| fold_text(k).contains(&needle))
        })
        .cloned()
        .collect()
}

/// Group by category in display order, keeping the input order inside groups.
/// Empty groups are left out.
pub fn group_commands(commands: &[PaletteCommand]) -> Vec<(PaletteCategory, Vec<PaletteCommand>)> {
    [PaletteCategory::Navigation, PaletteCategory::Actions, PaletteCategory::Quick]
        .into_iter()
        .map(|category| {
            let members: Vec<_> = commands.iter().filter(|c| c.category == category).cloned().collect();
            (category, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteOutcome {
    Ignored,
    Opened,
    Closed,
    Updated,
    Selected(PaletteCommand),
}

#[derive(Debug, Clone)]
pub struct PaletteState {
    commands: Vec<PaletteCommand>,
    open: bool,
    query: String,
    selected: usize,
}

impl Default for PaletteState {
    fn default() -> Self {
        Self::new(default_commands())
    }
}

impl PaletteState {
    pub fn new(commands: Vec<PaletteCommand>) -> Self {
        Self {
            commands,
            open: false,
            query: String::new(),
            selected: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Closing always clears the query and selection
    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.selected = 0;
    }

    pub fn visible(&self) -> Vec<PaletteCommand> {
        filter_commands(&self.commands, &self.query)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PaletteOutcome {
        let toggle = key.code == KeyCode::Char('k')
            && (key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::SUPER));
        if toggle {
            return if self.open {
                self.close();
                PaletteOutcome::Closed
            } else {
                self.open();
                PaletteOutcome::Opened
            };
        }
        if !self.open {
            return PaletteOutcome::Ignored;
        }

        let count = self.visible().len();
        match key.code {
            KeyCode::Esc => {
                self.close();
                PaletteOutcome::Closed
            }
            KeyCode::Down => {
                self.selected = if self.selected + 1 < count { self.selected + 1 } else { 0 };
                PaletteOutcome::Updated
            }
            KeyCode::Up => {
                self.selected = if self.selected > 0 { self.selected - 1 } else { count.saturating_sub(1) };
                PaletteOutcome::Updated
            }
            KeyCode::Enter => match self.visible().into_iter().nth(self.selected) {
                Some(command) => {
                    self.close();
                    PaletteOutcome::Selected(command)
                }
                None => PaletteOutcome::Ignored,
            },
            KeyCode::Backspace => {
                self.query.pop();
                self.selected = 0;
                PaletteOutcome::Updated
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.query.push(c);
                self.selected = 0;
                PaletteOutcome::Updated
            }
            _ => PaletteOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_k() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL)
    }

    fn type_text(state: &mut PaletteState, text: &str) {
        for c in text.chars() {
            state.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_default_commands() {
        let commands = default_commands();
        assert_eq!(commands.len(), 16);
        let groups = group_commands(&commands);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 13);
        assert_eq!(groups[1].0, PaletteCategory::Actions);
        assert_eq!(groups[1].1.len(), 3);
    }

    #[test]
    fn test_filter_is_accent_insensitive() {
        let commands = default_commands();
        assert_eq!(filter_commands(&commands, "").len(), 16);
        assert_eq!(filter_commands(&commands, "   ").len(), 16);

        let hits = filter_commands(&commands, "PROJEÇÕES");
        assert_eq!(hits[0].id, "projections");

        let ids: Vec<_> = filter_commands(&commands, "resumo").iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["dashboard", "monthly-summary", "annual-summary"]);

        assert!(filter_commands(&commands, "zzz").is_empty());

        let hits = filter_commands(&commands, "patrimônio");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cli_command, "assets summary");
    }

    #[test]
    fn test_toggle_and_ignore_when_closed() {
        let mut state = PaletteState::default();
        assert_eq!(state.handle_key(key(KeyCode::Down)), PaletteOutcome::Ignored);
        assert_eq!(state.handle_key(ctrl_k()), PaletteOutcome::Opened);
        let cmd_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::SUPER);
        assert_eq!(state.handle_key(cmd_k), PaletteOutcome::Closed);
        assert!(!state.is_open());
    }

    #[test]
    fn test_navigation_wraps() {
        let mut state = PaletteState::default();
        state.handle_key(ctrl_k());
        state.handle_key(key(KeyCode::Up));
        assert_eq!(state.selected_index(), 15);
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.selected_index(), 0);
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.selected_index(), 1);
    }

    #[test]
    fn test_typing_resets_selection_and_enter_selects() {
        let mut state = PaletteState::default();
        state.handle_key(ctrl_k());
        state.handle_key(key(KeyCode::Down));
        type_text(&mut state, "cart");
        assert_eq!(state.selected_index(), 0);
        assert_eq!(state.query(), "cart");

        state.handle_key(key(KeyCode::Down));
        match state.handle_key(key(KeyCode::Enter)) {
            PaletteOutcome::Selected(cmd) => assert_eq!(cmd.id, "quick-card"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!state.is_open());
        assert_eq!(state.query(), "");
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn test_escape_resets_and_enter_on_empty_list() {
        let mut state = PaletteState::default();
        state.handle_key(ctrl_k());
        type_text(&mut state, "nada disso");
        assert_eq!(state.handle_key(key(KeyCode::Enter)), PaletteOutcome::Ignored);
        assert_eq!(state.handle_key(key(KeyCode::Down)), PaletteOutcome::Updated);
        assert_eq!(state.selected_index(), 0);

        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.query(), "nada diss");
        assert_eq!(state.handle_key(key(KeyCode::Esc)), PaletteOutcome::Closed);
        assert_eq!(state.query(), "");
    }
}
