//! Key events to store actions.

use crate::kernel::{Action, AppState, ProgramTab, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Output lines moved per PgUp/PgDn.
pub const SCROLL_PAGE: isize = 10;

#[derive(Debug)]
pub enum KeyOutcome {
    Action(Action),
    Quit,
    Ignored,
}

pub fn map_key(state: &AppState, key: KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Ignored;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }

    match state.screen {
        Screen::Gallery => map_gallery_key(key),
        Screen::Program => {
            let tab = state
                .program
                .as_ref()
                .map(|view| view.tab)
                .unwrap_or_default();
            map_program_key(tab, key, ctrl)
        }
    }
}

fn map_gallery_key(key: KeyEvent) -> KeyOutcome {
    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::GalleryMoveSelection(-1),
        KeyCode::Down | KeyCode::Char('j') => Action::GalleryMoveSelection(1),
        KeyCode::Enter => Action::GalleryOpenSelected,
        KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
        _ => return KeyOutcome::Ignored,
    };
    KeyOutcome::Action(action)
}

fn map_program_key(tab: ProgramTab, key: KeyEvent, ctrl: bool) -> KeyOutcome {
    let action = match key.code {
        KeyCode::Tab | KeyCode::BackTab => Action::ToggleTab,
        KeyCode::Esc => Action::Back,
        KeyCode::PageUp => Action::ScrollOutput(SCROLL_PAGE),
        KeyCode::PageDown => Action::ScrollOutput(-SCROLL_PAGE),
        _ if tab != ProgramTab::Run => return KeyOutcome::Ignored,
        KeyCode::Char('r') if ctrl => Action::Start,
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::InputBackspace,
        KeyCode::Delete => Action::InputDelete,
        KeyCode::Left => Action::InputCursorLeft,
        KeyCode::Right => Action::InputCursorRight,
        KeyCode::Home => Action::InputHome,
        KeyCode::End => Action::InputEnd,
        KeyCode::Char(ch) if !ctrl => Action::InputInsert(ch),
        _ => return KeyOutcome::Ignored,
    };
    KeyOutcome::Action(action)
}

#[cfg(test)]
#[path = "../../tests/unit/tui/input.rs"]
mod tests;
