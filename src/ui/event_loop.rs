//! Minimal event loop wrapper around crossterm polling.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Input(KeyEvent),
    Tick,
    Other,
}

pub fn map_event(ev: CrosstermEvent) -> AppEvent {
    match ev {
        // Windows reports both press and release
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Input(key),
        _ => AppEvent::Other,
    }
}

/// Poll for a terminal event; returns Tick when the timeout expires.
pub fn poll_event(timeout: Duration) -> anyhow::Result<AppEvent> {
    if event::poll(timeout)? {
        let ev = event::read()?;
        Ok(map_event(ev))
    } else {
        Ok(AppEvent::Tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn map_key_event_to_input() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_event(CrosstermEvent::Key(key)), AppEvent::Input(key));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_event(CrosstermEvent::Key(key)), AppEvent::Other);
    }

    #[test]
    fn resize_is_other() {
        assert_eq!(map_event(CrosstermEvent::Resize(80, 24)), AppEvent::Other);
    }
}
