//! Input handling and keybindings

use crate::app::App;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::warn;

/// Lines moved per mouse wheel notch
const WHEEL_LINES: isize = 3;

/// Result of handling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Handle a key press
pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<Action> {
    // Any real keystroke dismisses the last status message
    if !matches!(key.code, KeyCode::Modifier(_)) {
        app.clear_status_message();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.quit();
                return Ok(Action::Quit);
            }
            KeyCode::Char('d') => app.scroll_half_page_down(),
            KeyCode::Char('u') => app.scroll_half_page_up(),
            _ => {}
        }
        return Ok(Action::Continue);
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.toggle_help();
        }
        return Ok(Action::Continue);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.quit();
            return Ok(Action::Quit);
        }
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('t') => app.toggle_toc(),
        KeyCode::Tab => app.toggle_toc_focus(),
        KeyCode::Char('m') => app.toggle_theme(),
        KeyCode::Char('r') => {
            if let Err(e) = app.reload_post() {
                warn!("reload failed: {:#}", e);
                app.set_status_message(format!("Reload failed: {}", e));
            }
        }
        KeyCode::Char(']') => app.next_heading(),
        KeyCode::Char('[') => app.prev_heading(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to(0),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Char(' ') | KeyCode::PageDown => app.scroll_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        #[cfg(feature = "clipboard")]
        KeyCode::Char('y') => app.copy_selected_anchor(),
        KeyCode::Esc if app.toc_focus => app.toggle_toc_focus(),
        _ if app.toc_focus => handle_toc_key(app, key),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_by(-1),
        _ => {}
    }

    Ok(Action::Continue)
}

fn handle_toc_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.toc_move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.toc_move_up(),
        KeyCode::Enter => app.toc_jump_to_selected(),
        _ => {}
    }
}

/// Handle wheel scrolling and clicks on sidebar entries
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_by(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_by(-WHEEL_LINES),
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(idx) = app.toc_entry_at(mouse.column, mouse.row) {
                app.toc_selected = idx;
                app.jump_to_heading(idx);
            }
        }
        _ => {}
    }
}
