use crossterm::event::KeyCode;
use pseudodojo_core::{PreferenceKey, PseudoType};

use crate::app::state::App;

pub async fn handle_input(app: &mut App, key: KeyCode) {
    if handle_help_toggle(app, key) {
        return;
    }

    match key {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.leave(),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1, 0),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1, 0),
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(0, -1),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(0, 1),
        KeyCode::Tab => app.toggle_archive(),
        KeyCode::Enter => app.click(),
        KeyCode::Char('t') => cycle_type(app, PseudoType::next),
        KeyCode::Char('T') => cycle_type(app, PseudoType::prev),
        KeyCode::Char('x') => app.cycle_value(PreferenceKey::Functional, 1).await,
        KeyCode::Char('X') => app.cycle_value(PreferenceKey::Functional, -1).await,
        KeyCode::Char('a') => app.cycle_value(PreferenceKey::Accuracy, 1).await,
        KeyCode::Char('A') => app.cycle_value(PreferenceKey::Accuracy, -1).await,
        KeyCode::Char('f') => app.cycle_value(PreferenceKey::Format, 1).await,
        KeyCode::Char('F') => app.cycle_value(PreferenceKey::Format, -1).await,
        KeyCode::Char('b') => app.dismiss_banner(),
        _ => {}
    }
}

fn cycle_type(app: &mut App, step: fn(PseudoType) -> PseudoType) {
    app.set_type(step(app.options.typ));
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if key == KeyCode::F(1) || key == KeyCode::Char('?') {
        app.toggle_help();
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}
