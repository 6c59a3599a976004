// UI module for the table browser

pub mod render;
pub mod widgets;

use crate::app::App;
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    render::render_browser(app, f);
    if app.show_help {
        render::render_help(f, f.area());
    }
}
