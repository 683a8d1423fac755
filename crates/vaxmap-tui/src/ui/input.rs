//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Focus, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        // Only quitting is possible while the splash runs
        AppState::Splash => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            Ok(false)
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            Ok(false)
        }
        AppState::ShowingDebug => {
            handle_debug_input(app, key);
            Ok(false)
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            Ok(false)
        }
        AppState::Searching => {
            handle_search_input(app, key);
            Ok(false)
        }
        AppState::Quitting => Ok(true),
        AppState::Normal => {
            handle_normal_input(app, key);
            Ok(false)
        }
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('d') => app.state = AppState::ShowingDebug,
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.focus = Focus::List;
        }
        KeyCode::Char('r') => app.recache(),
        KeyCode::Up | KeyCode::Char('k') => {
            if app.focus == Focus::List {
                app.move_selection(-1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.focus == Focus::List {
                app.move_selection(1);
            }
        }
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.selection = 0,
        KeyCode::End => app.move_selection(isize::MAX / 2),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Tab => {
            if app.focus == Focus::List {
                app.open_selected();
            } else {
                app.close_detail();
            }
        }
        KeyCode::Esc => {
            if app.focus == Focus::Detail {
                app.close_detail();
            } else if !app.search_query.is_empty() {
                app.search_query.clear();
                app.selection = 0;
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
            app.selection = 0;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_debug_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('d') | KeyCode::Char('q') => app.state = AppState::Normal,
        KeyCode::Char('c') => app.clear_cache(),
        KeyCode::Char('r') => app.recache(),
        KeyCode::Char('n') => app.log_count(),
        KeyCode::Char('s') => app.toggle_slow_mode(),
        _ => {}
    }
}
