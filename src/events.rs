//! Terminal event polling and key handling.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Input};

/// Poll for events with a timeout.
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.editing.is_some() {
        handle_edit_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // Pane focus
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),

        // Fetch actions
        KeyCode::Char('r') => app.refresh_routing(),
        KeyCode::Char('a') => app.get_all_sms(),
        KeyCode::Char('g') => app.get_filtered_sms(),
        KeyCode::Char('s') | KeyCode::Enter => app.submit_filter_form(),

        // Form field editing
        KeyCode::Char('d') => app.start_editing(Input::Date),
        KeyCode::Char('m') => app.start_editing(Input::Mobile),

        // Row filter (SMS pane only)
        KeyCode::Char('/') => app.start_editing(Input::Filter),
        KeyCode::Char('c') => app.clear_filter(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_n(1),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_n(1),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key input while a field is being edited.
fn handle_edit_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm, keeping the entered text
        KeyCode::Enter | KeyCode::Esc => app.stop_editing(),

        // Clear a filter entirely
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.editing == Some(Input::Filter) {
                app.clear_filter();
            }
        }

        KeyCode::Backspace => app.edit_pop(),
        KeyCode::Char(c) => app.edit_push(c),

        _ => {}
    }
}
