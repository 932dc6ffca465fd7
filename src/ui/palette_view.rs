//! Full-screen command palette on the alternate screen.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use crossterm::{
    cursor,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use unicode_width::UnicodeWidthStr;

use crate::ui::event_loop::{poll_event, AppEvent};
use financetrack::palette::{group_commands, PaletteCommand, PaletteOutcome, PaletteState};

const LABEL_WIDTH: usize = 24;

/// Restores the terminal even when drawing fails halfway
struct RawScreen;

impl RawScreen {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawScreen {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn pad_to(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

/// Lines of the palette, grouped by category, with the selection marked
pub fn render_palette(state: &PaletteState) -> Vec<String> {
    let visible = state.visible();
    let selected_id = visible.get(state.selected_index()).map(|c| c.id);

    let mut lines = vec![
        format!("{} {}", "⌘".cyan().bold(), "Paleta de comandos".bold()),
        format!("  > {}▏", state.query()),
        String::new(),
    ];
    if visible.is_empty() {
        lines.push(format!("  {}", "Nenhum comando encontrado".bright_black()));
    }
    for (category, commands) in group_commands(&visible) {
        lines.push(format!("  {}", category.label().to_uppercase().bright_black()));
        for command in commands {
            let label = pad_to(command.label, LABEL_WIDTH);
            if Some(command.id) == selected_id {
                lines.push(format!("  {} {} {}", "›".cyan().bold(), label.cyan().bold(), command.description));
            } else {
                lines.push(format!("    {} {}", label, command.description.bright_black()));
            }
        }
    }
    lines.push(String::new());
    lines.push(format!("  {}", "↑↓ navegar · Enter executar · Esc ou Ctrl+C fechar".bright_black()));
    lines
}

fn draw(state: &PaletteState) -> Result<()> {
    let mut out = io::stdout();
    queue!(out, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    for line in render_palette(state) {
        // Raw mode needs explicit carriage returns
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()?;
    Ok(())
}

/// Raw mode swallows SIGINT, so Ctrl+C arrives as a key
fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
}

/// Show the palette until a command is picked or it is closed
pub fn pick_command() -> Result<Option<PaletteCommand>> {
    let mut state = PaletteState::default();
    state.open();
    let _screen = RawScreen::enter()?;
    draw(&state)?;

    loop {
        let AppEvent::Input(key) = poll_event(Duration::from_millis(250))? else {
            continue;
        };
        if is_interrupt(&key) {
            state.close();
            return Ok(None);
        }
        match state.handle_key(key) {
            PaletteOutcome::Selected(command) => return Ok(Some(command)),
            PaletteOutcome::Closed => return Ok(None),
            PaletteOutcome::Updated | PaletteOutcome::Opened => draw(&state)?,
            PaletteOutcome::Ignored => {}
        }
    }
}
